//! A self-contained starter template: one master, five layouts, one theme.

use std::fmt::Write as FmtWrite;

use super::content_types::{CONTENT_TYPES_PART, ContentTypes};
use super::layout::Rect;
use super::package::Package;
use super::rels::{REL_OFFICE_DOCUMENT, REL_SLIDE_LAYOUT, REL_SLIDE_MASTER, REL_THEME, Relationships};
use super::xml::{XML_DECL, esc};

const NS_DECLS: &str = concat!(
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#
);

const CT_PRESENTATION: &str = "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml";
const CT_MASTER: &str = "application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml";
const CT_LAYOUT: &str = "application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml";
const CT_THEME: &str = "application/vnd.openxmlformats-officedocument.theme+xml";
const CT_PRES_PROPS: &str = "application/vnd.openxmlformats-officedocument.presentationml.presProps+xml";
const CT_VIEW_PROPS: &str = "application/vnd.openxmlformats-officedocument.presentationml.viewProps+xml";
const CT_TABLE_STYLES: &str = "application/vnd.openxmlformats-officedocument.presentationml.tableStyles+xml";
const CT_CORE: &str = "application/vnd.openxmlformats-package.core-properties+xml";
const CT_APP: &str = "application/vnd.openxmlformats-officedocument.extended-properties+xml";
const CT_RELS: &str = "application/vnd.openxmlformats-package.relationships+xml";

const REL_PRES_PROPS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/presProps";
const REL_VIEW_PROPS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/viewProps";
const REL_TABLE_STYLES: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/tableStyles";
const REL_CORE: &str = "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
const REL_APP: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/extended-properties";

const SLIDE_CX: i64 = 9_144_000;
const SLIDE_CY: i64 = 6_858_000;

struct ShapeSpec {
    name: &'static str,
    ph_type: Option<&'static str>,
    idx: Option<u32>,
    size: Option<&'static str>,
    rect: Option<Rect>,
}

struct LayoutSpec {
    name: &'static str,
    kind: &'static str,
    shapes: &'static [ShapeSpec],
}

const TITLE: ShapeSpec = ShapeSpec { name: "Title 1", ph_type: Some("title"), idx: None, size: None, rect: None };

const LAYOUTS: &[LayoutSpec] = &[
    LayoutSpec {
        name: "Title Slide",
        kind: "title",
        shapes: &[
            ShapeSpec {
                name: "Title 1",
                ph_type: Some("ctrTitle"),
                idx: None,
                size: None,
                rect: Some(Rect { x: 685_800, y: 2_130_425, cx: 7_772_400, cy: 1_470_025 }),
            },
            ShapeSpec {
                name: "Subtitle 2",
                ph_type: Some("subTitle"),
                idx: Some(1),
                size: None,
                rect: Some(Rect { x: 1_371_600, y: 3_886_200, cx: 6_400_800, cy: 1_752_600 }),
            },
        ],
    },
    LayoutSpec {
        name: "Title and Content",
        kind: "obj",
        shapes: &[
            TITLE,
            ShapeSpec { name: "Content Placeholder 2", ph_type: None, idx: Some(1), size: None, rect: None },
        ],
    },
    LayoutSpec {
        name: "Two Content",
        kind: "twoObj",
        shapes: &[
            TITLE,
            ShapeSpec {
                name: "Content Placeholder 2",
                ph_type: None,
                idx: Some(1),
                size: Some("half"),
                rect: Some(Rect { x: 457_200, y: 1_600_200, cx: 4_038_600, cy: 4_525_963 }),
            },
            ShapeSpec {
                name: "Content Placeholder 3",
                ph_type: None,
                idx: Some(2),
                size: Some("half"),
                rect: Some(Rect { x: 4_648_200, y: 1_600_200, cx: 4_038_600, cy: 4_525_963 }),
            },
        ],
    },
    LayoutSpec { name: "Title Only", kind: "titleOnly", shapes: &[TITLE] },
    LayoutSpec {
        name: "Picture with Caption",
        kind: "picTx",
        shapes: &[
            ShapeSpec {
                name: "Title 1",
                ph_type: Some("title"),
                idx: None,
                size: None,
                rect: Some(Rect { x: 1_792_288, y: 4_800_600, cx: 5_486_400, cy: 566_738 }),
            },
            ShapeSpec {
                name: "Picture Placeholder 2",
                ph_type: Some("pic"),
                idx: Some(1),
                size: None,
                rect: Some(Rect { x: 1_792_288, y: 612_775, cx: 5_486_400, cy: 4_114_800 }),
            },
            ShapeSpec {
                name: "Text Placeholder 3",
                ph_type: Some("body"),
                idx: Some(2),
                size: Some("quarter"),
                rect: Some(Rect { x: 1_792_288, y: 5_367_338, cx: 5_486_400, cy: 804_862 }),
            },
        ],
    },
];

const MASTER_SHAPES: &[ShapeSpec] = &[
    ShapeSpec {
        name: "Title Placeholder 1",
        ph_type: Some("title"),
        idx: None,
        size: None,
        rect: Some(Rect { x: 457_200, y: 274_638, cx: 8_229_600, cy: 1_143_000 }),
    },
    ShapeSpec {
        name: "Text Placeholder 2",
        ph_type: Some("body"),
        idx: Some(1),
        size: None,
        rect: Some(Rect::DEFAULT_BODY),
    },
    ShapeSpec {
        name: "Date Placeholder 3",
        ph_type: Some("dt"),
        idx: Some(2),
        size: Some("half"),
        rect: Some(Rect { x: 457_200, y: 6_356_350, cx: 2_133_600, cy: 365_125 }),
    },
    ShapeSpec {
        name: "Footer Placeholder 4",
        ph_type: Some("ftr"),
        idx: Some(3),
        size: Some("quarter"),
        rect: Some(Rect { x: 3_124_200, y: 6_356_350, cx: 2_895_600, cy: 365_125 }),
    },
    ShapeSpec {
        name: "Slide Number Placeholder 5",
        ph_type: Some("sldNum"),
        idx: Some(4),
        size: Some("quarter"),
        rect: Some(Rect { x: 6_553_200, y: 6_356_350, cx: 2_133_600, cy: 365_125 }),
    },
];

/// Build the default template package.
pub fn default_template() -> Package {
    let mut pkg = Package::default();
    let mut ct = ContentTypes::default();
    ct.add_default("rels", CT_RELS);
    ct.add_default("xml", "application/xml");

    let mut root = Relationships::default();
    root.add(REL_OFFICE_DOCUMENT, "ppt/presentation.xml");
    root.add(REL_CORE, "docProps/core.xml");
    root.add(REL_APP, "docProps/app.xml");
    pkg.set_part("_rels/.rels", root.to_xml().into_bytes());

    let mut pres_rels = Relationships::default();
    let master_rid = pres_rels.add(REL_SLIDE_MASTER, "slideMasters/slideMaster1.xml");
    pres_rels.add(REL_THEME, "theme/theme1.xml");
    pres_rels.add(REL_PRES_PROPS, "presProps.xml");
    pres_rels.add(REL_VIEW_PROPS, "viewProps.xml");
    pres_rels.add(REL_TABLE_STYLES, "tableStyles.xml");
    pkg.set_part("ppt/_rels/presentation.xml.rels", pres_rels.to_xml().into_bytes());
    pkg.set_part("ppt/presentation.xml", presentation_xml(&master_rid).into_bytes());
    ct.add_override("ppt/presentation.xml", CT_PRESENTATION);

    let mut master_rels = Relationships::default();
    let mut layout_rids = Vec::with_capacity(LAYOUTS.len());
    for (i, layout) in LAYOUTS.iter().enumerate() {
        let n = i + 1;
        let part = format!("ppt/slideLayouts/slideLayout{n}.xml");
        layout_rids.push(master_rels.add(REL_SLIDE_LAYOUT, &format!("../slideLayouts/slideLayout{n}.xml")));

        let mut rels = Relationships::default();
        rels.add(REL_SLIDE_MASTER, "../slideMasters/slideMaster1.xml");
        pkg.set_part(&format!("ppt/slideLayouts/_rels/slideLayout{n}.xml.rels"), rels.to_xml().into_bytes());
        pkg.set_part(&part, layout_xml(layout).into_bytes());
        ct.add_override(&part, CT_LAYOUT);
    }
    master_rels.add(REL_THEME, "../theme/theme1.xml");
    pkg.set_part("ppt/slideMasters/_rels/slideMaster1.xml.rels", master_rels.to_xml().into_bytes());
    pkg.set_part("ppt/slideMasters/slideMaster1.xml", master_xml(&layout_rids).into_bytes());
    ct.add_override("ppt/slideMasters/slideMaster1.xml", CT_MASTER);

    pkg.set_part("ppt/theme/theme1.xml", THEME_XML.as_bytes().to_vec());
    ct.add_override("ppt/theme/theme1.xml", CT_THEME);

    pkg.set_part("ppt/presProps.xml", format!("{XML_DECL}<p:presentationPr {NS_DECLS}/>").into_bytes());
    ct.add_override("ppt/presProps.xml", CT_PRES_PROPS);
    pkg.set_part(
        "ppt/viewProps.xml",
        format!(r#"{XML_DECL}<p:viewPr {NS_DECLS}><p:gridSpacing cx="76200" cy="76200"/></p:viewPr>"#).into_bytes(),
    );
    ct.add_override("ppt/viewProps.xml", CT_VIEW_PROPS);
    pkg.set_part(
        "ppt/tableStyles.xml",
        format!(
            r#"{XML_DECL}<a:tblStyleLst xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" def="{{5C22544A-7EE6-4342-B048-85BDC9FD1C3A}}"/>"#
        )
        .into_bytes(),
    );
    ct.add_override("ppt/tableStyles.xml", CT_TABLE_STYLES);

    pkg.set_part("docProps/core.xml", CORE_XML.as_bytes().to_vec());
    ct.add_override("docProps/core.xml", CT_CORE);
    pkg.set_part("docProps/app.xml", APP_XML.as_bytes().to_vec());
    ct.add_override("docProps/app.xml", CT_APP);

    pkg.set_part(CONTENT_TYPES_PART, ct.to_xml().into_bytes());
    pkg
}

fn presentation_xml(master_rid: &str) -> String {
    format!(
        concat!(
            "{decl}<p:presentation {ns} saveSubsetFonts=\"1\">",
            "<p:sldMasterIdLst><p:sldMasterId id=\"2147483648\" r:id=\"{rid}\"/></p:sldMasterIdLst>",
            "<p:sldSz cx=\"{cx}\" cy=\"{cy}\" type=\"screen4x3\"/>",
            "<p:notesSz cx=\"{cy}\" cy=\"{cx}\"/>",
            "</p:presentation>"
        ),
        decl = XML_DECL,
        ns = NS_DECLS,
        rid = master_rid,
        cx = SLIDE_CX,
        cy = SLIDE_CY,
    )
}

fn write_group_header(xml: &mut String) {
    xml.push_str(r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr>"#);
    xml.push_str(concat!(
        r#"<p:grpSpPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/>"#,
        r#"<a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm></p:grpSpPr>"#
    ));
}

fn write_shapes(xml: &mut String, shapes: &[ShapeSpec]) {
    for (i, shape) in shapes.iter().enumerate() {
        let _ = write!(
            xml,
            r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/><p:cNvSpPr><a:spLocks noGrp="1"/></p:cNvSpPr><p:nvPr><p:ph"#,
            i + 2,
            esc(shape.name)
        );
        if let Some(t) = shape.ph_type {
            let _ = write!(xml, r#" type="{t}""#);
        }
        if let Some(sz) = shape.size {
            let _ = write!(xml, r#" sz="{sz}""#);
        }
        if let Some(idx) = shape.idx {
            let _ = write!(xml, r#" idx="{idx}""#);
        }
        xml.push_str("/></p:nvPr></p:nvSpPr>");
        match shape.rect {
            Some(r) => {
                let _ = write!(
                    xml,
                    r#"<p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm></p:spPr>"#,
                    r.x, r.y, r.cx, r.cy
                );
            }
            None => xml.push_str("<p:spPr/>"),
        }
        if shape.ph_type != Some("pic") {
            xml.push_str(r#"<p:txBody><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang="en-US"/></a:p></p:txBody>"#);
        }
        xml.push_str("</p:sp>");
    }
}

fn layout_xml(layout: &LayoutSpec) -> String {
    let mut xml = String::with_capacity(2048);
    xml.push_str(XML_DECL);
    let _ = write!(xml, r#"<p:sldLayout {NS_DECLS} type="{}" preserve="1">"#, layout.kind);
    let _ = write!(xml, r#"<p:cSld name="{}"><p:spTree>"#, esc(layout.name));
    write_group_header(&mut xml);
    write_shapes(&mut xml, layout.shapes);
    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>");
    xml
}

fn master_xml(layout_rids: &[String]) -> String {
    let mut xml = String::with_capacity(4096);
    xml.push_str(XML_DECL);
    let _ = write!(xml, "<p:sldMaster {NS_DECLS}>");
    xml.push_str(r#"<p:cSld><p:bg><p:bgRef idx="1001"><a:schemeClr val="bg1"/></p:bgRef></p:bg><p:spTree>"#);
    write_group_header(&mut xml);
    write_shapes(&mut xml, MASTER_SHAPES);
    xml.push_str("</p:spTree></p:cSld>");
    xml.push_str(concat!(
        r#"<p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" "#,
        r#"accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/>"#
    ));
    xml.push_str("<p:sldLayoutIdLst>");
    for (i, rid) in layout_rids.iter().enumerate() {
        let _ = write!(xml, r#"<p:sldLayoutId id="{}" r:id="{rid}"/>"#, 2_147_483_649u64 + i as u64);
    }
    xml.push_str("</p:sldLayoutIdLst>");
    xml.push_str(concat!(
        "<p:txStyles>",
        r#"<p:titleStyle><a:lvl1pPr algn="l"><a:defRPr sz="4000" b="1"><a:solidFill><a:schemeClr val="tx2"/></a:solidFill>"#,
        r#"<a:latin typeface="+mj-lt"/></a:defRPr></a:lvl1pPr></p:titleStyle>"#,
        r#"<p:bodyStyle><a:lvl1pPr marL="0" indent="0"><a:spcBef><a:spcPts val="600"/></a:spcBef><a:buNone/>"#,
        r#"<a:defRPr sz="2400"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill><a:latin typeface="+mn-lt"/></a:defRPr></a:lvl1pPr>"#,
        r#"<a:lvl2pPr marL="457200" indent="0"><a:buNone/><a:defRPr sz="2000"/></a:lvl2pPr></p:bodyStyle>"#,
        r#"<p:otherStyle><a:lvl1pPr><a:defRPr sz="1800"><a:solidFill><a:schemeClr val="tx1"/></a:solidFill></a:defRPr></a:lvl1pPr></p:otherStyle>"#,
        "</p:txStyles>"
    ));
    xml.push_str("</p:sldMaster>");
    xml
}

const THEME_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Modern"><a:themeElements>"#,
    r#"<a:clrScheme name="Modern">"#,
    r#"<a:dk1><a:srgbClr val="1F2937"/></a:dk1><a:lt1><a:srgbClr val="FFFFFF"/></a:lt1>"#,
    r#"<a:dk2><a:srgbClr val="1E3A5F"/></a:dk2><a:lt2><a:srgbClr val="F3F4F6"/></a:lt2>"#,
    r#"<a:accent1><a:srgbClr val="2563EB"/></a:accent1><a:accent2><a:srgbClr val="10B981"/></a:accent2>"#,
    r#"<a:accent3><a:srgbClr val="F59E0B"/></a:accent3><a:accent4><a:srgbClr val="EF4444"/></a:accent4>"#,
    r#"<a:accent5><a:srgbClr val="8B5CF6"/></a:accent5><a:accent6><a:srgbClr val="06B6D4"/></a:accent6>"#,
    r#"<a:hlink><a:srgbClr val="2563EB"/></a:hlink><a:folHlink><a:srgbClr val="7C3AED"/></a:folHlink>"#,
    r#"</a:clrScheme>"#,
    r#"<a:fontScheme name="Modern">"#,
    r#"<a:majorFont><a:latin typeface="Calibri Light"/><a:ea typeface=""/><a:cs typeface=""/></a:majorFont>"#,
    r#"<a:minorFont><a:latin typeface="Calibri"/><a:ea typeface=""/><a:cs typeface=""/></a:minorFont>"#,
    r#"</a:fontScheme>"#,
    r#"<a:fmtScheme name="Modern">"#,
    r#"<a:fillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"><a:tint val="50000"/></a:schemeClr></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"><a:shade val="80000"/></a:schemeClr></a:solidFill></a:fillStyleLst>"#,
    r#"<a:lnStyleLst><a:ln w="9525"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
    r#"<a:ln w="25400"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln>"#,
    r#"<a:ln w="38100"><a:solidFill><a:schemeClr val="phClr"/></a:solidFill></a:ln></a:lnStyleLst>"#,
    r#"<a:effectStyleLst><a:effectStyle><a:effectLst/></a:effectStyle><a:effectStyle><a:effectLst/></a:effectStyle>"#,
    r#"<a:effectStyle><a:effectLst/></a:effectStyle></a:effectStyleLst>"#,
    r#"<a:bgFillStyleLst><a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"><a:tint val="95000"/></a:schemeClr></a:solidFill>"#,
    r#"<a:solidFill><a:schemeClr val="phClr"><a:shade val="90000"/></a:schemeClr></a:solidFill></a:bgFillStyleLst>"#,
    r#"</a:fmtScheme></a:themeElements><a:objectDefaults/><a:extraClrSchemeLst/></a:theme>"#
);

const CORE_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" "#,
    r#"xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" "#,
    r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">"#,
    r#"<dc:title>Lesson</dc:title><dc:creator>lessondeck</dc:creator></cp:coreProperties>"#
);

const APP_XML: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties">"#,
    r#"<Application>lessondeck</Application></Properties>"#
);
