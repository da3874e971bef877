//! Chart part XML (`ppt/charts/chartN.xml`).
//!
//! Data is written as literals (`c:strLit` / `c:numLit`) with no embedded
//! workbook, so the chart renders but its data cannot be edited in place.

use std::fmt::Write as FmtWrite;

use super::xml::{XML_DECL, esc};

const CAT_AX_ID: u32 = 1;
const VAL_AX_ID: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Horizontal bars.
    Bar,
    /// Vertical bars.
    Column,
    Line,
    Pie,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    Clustered,
    Stacked,
    PercentStacked,
}

impl Grouping {
    fn bar_value(self) -> &'static str {
        match self {
            Grouping::Clustered => "clustered",
            Grouping::Stacked => "stacked",
            Grouping::PercentStacked => "percentStacked",
        }
    }

    fn line_value(self) -> &'static str {
        match self {
            Grouping::Clustered => "standard",
            Grouping::Stacked => "stacked",
            Grouping::PercentStacked => "percentStacked",
        }
    }
}

/// Chart style picked from a free-form name such as `bar`, `COLUMN_STACKED`,
/// `line_markers` or `pie`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartStyle {
    pub kind: ChartKind,
    pub grouping: Grouping,
    pub markers: bool,
}

impl ChartStyle {
    pub const DEFAULT: ChartStyle = ChartStyle { kind: ChartKind::Bar, grouping: Grouping::Clustered, markers: false };

    /// `None` when the name matches no known chart family.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase().replace(['-', ' '], "_");
        let kind = if name.starts_with("column") || name == "col" || name == "vertical_bar" {
            ChartKind::Column
        } else if name.starts_with("bar") || name == "horizontal_bar" {
            ChartKind::Bar
        } else if name.starts_with("line") {
            ChartKind::Line
        } else if name.starts_with("pie") || name.starts_with("doughnut") {
            ChartKind::Pie
        } else {
            return None;
        };
        let grouping = if name.contains("stacked_100") || name.contains("percent") {
            Grouping::PercentStacked
        } else if name.contains("stacked") {
            Grouping::Stacked
        } else {
            Grouping::Clustered
        };
        Some(Self { kind, grouping, markers: name.contains("marker") })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPlot {
    pub style: ChartStyle,
    pub categories: Vec<String>,
    /// Series name and values, one value per category.
    pub series: Vec<(String, Vec<f64>)>,
}

pub fn chart_xml(plot: &ChartPlot) -> String {
    let mut xml = String::with_capacity(2048);
    xml.push_str(XML_DECL);
    xml.push_str(concat!(
        r#"<c:chartSpace xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" "#,
        r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
        r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        r#"<c:date1904 val="0"/><c:lang val="en-US"/><c:roundedCorners val="0"/>"#,
        r#"<c:chart><c:autoTitleDeleted val="1"/><c:plotArea><c:layout/>"#
    ));

    let style = plot.style;
    match style.kind {
        ChartKind::Bar | ChartKind::Column => {
            let dir = if style.kind == ChartKind::Bar { "bar" } else { "col" };
            let _ = write!(
                xml,
                r#"<c:barChart><c:barDir val="{dir}"/><c:grouping val="{}"/><c:varyColors val="0"/>"#,
                style.grouping.bar_value()
            );
            write_series(&mut xml, plot, None);
            xml.push_str(r#"<c:gapWidth val="150"/>"#);
            if style.grouping != Grouping::Clustered {
                xml.push_str(r#"<c:overlap val="100"/>"#);
            }
            let _ = write!(xml, r#"<c:axId val="{CAT_AX_ID}"/><c:axId val="{VAL_AX_ID}"/></c:barChart>"#);
            let (cat_pos, val_pos) = if style.kind == ChartKind::Bar { ("l", "b") } else { ("b", "l") };
            write_axes(&mut xml, cat_pos, val_pos);
        }
        ChartKind::Line => {
            let _ = write!(
                xml,
                r#"<c:lineChart><c:grouping val="{}"/><c:varyColors val="0"/>"#,
                style.grouping.line_value()
            );
            let marker = if style.markers { None } else { Some(r#"<c:marker><c:symbol val="none"/></c:marker>"#) };
            write_series(&mut xml, plot, marker);
            let _ = write!(
                xml,
                r#"<c:marker val="1"/><c:axId val="{CAT_AX_ID}"/><c:axId val="{VAL_AX_ID}"/></c:lineChart>"#
            );
            write_axes(&mut xml, "b", "l");
        }
        ChartKind::Pie => {
            xml.push_str(r#"<c:pieChart><c:varyColors val="1"/>"#);
            write_series(&mut xml, plot, None);
            xml.push_str(r#"<c:firstSliceAng val="0"/></c:pieChart>"#);
        }
    }

    xml.push_str(concat!(
        r#"</c:plotArea><c:legend><c:legendPos val="r"/><c:overlay val="0"/></c:legend>"#,
        r#"<c:plotVisOnly val="1"/><c:dispBlanksAs val="gap"/></c:chart></c:chartSpace>"#
    ));
    xml
}

/// `extra` is inserted between the series name and its data (line markers).
fn write_series(xml: &mut String, plot: &ChartPlot, extra: Option<&str>) {
    for (i, (name, values)) in plot.series.iter().enumerate() {
        let _ = write!(xml, r#"<c:ser><c:idx val="{i}"/><c:order val="{i}"/>"#);
        let name = if name.trim().is_empty() { format!("Series {}", i + 1) } else { name.clone() };
        let _ = write!(xml, "<c:tx><c:v>{}</c:v></c:tx>", esc(&name));
        if let Some(extra) = extra {
            xml.push_str(extra);
        }

        if !plot.categories.is_empty() {
            let _ = write!(xml, r#"<c:cat><c:strLit><c:ptCount val="{}"/>"#, plot.categories.len());
            for (idx, category) in plot.categories.iter().enumerate() {
                let _ = write!(xml, r#"<c:pt idx="{idx}"><c:v>{}</c:v></c:pt>"#, esc(category));
            }
            xml.push_str("</c:strLit></c:cat>");
        }

        let _ = write!(
            xml,
            r#"<c:val><c:numLit><c:formatCode>General</c:formatCode><c:ptCount val="{}"/>"#,
            values.len()
        );
        for (idx, value) in values.iter().enumerate().filter(|(_, v)| v.is_finite()) {
            let _ = write!(xml, r#"<c:pt idx="{idx}"><c:v>{value}</c:v></c:pt>"#);
        }
        xml.push_str("</c:numLit></c:val></c:ser>");
    }
}

fn write_axes(xml: &mut String, cat_pos: &str, val_pos: &str) {
    let _ = write!(
        xml,
        concat!(
            r#"<c:catAx><c:axId val="{cat}"/><c:scaling><c:orientation val="minMax"/></c:scaling>"#,
            r#"<c:delete val="0"/><c:axPos val="{cat_pos}"/><c:majorTickMark val="out"/>"#,
            r#"<c:minorTickMark val="none"/><c:tickLblPos val="nextTo"/><c:crossAx val="{val}"/>"#,
            r#"<c:crosses val="autoZero"/><c:auto val="1"/><c:lblAlgn val="ctr"/>"#,
            r#"<c:lblOffset val="100"/><c:noMultiLvlLbl val="0"/></c:catAx>"#,
            r#"<c:valAx><c:axId val="{val}"/><c:scaling><c:orientation val="minMax"/></c:scaling>"#,
            r#"<c:delete val="0"/><c:axPos val="{val_pos}"/><c:majorGridlines/>"#,
            r#"<c:numFmt formatCode="General" sourceLinked="0"/><c:majorTickMark val="out"/>"#,
            r#"<c:minorTickMark val="none"/><c:tickLblPos val="nextTo"/><c:crossAx val="{cat}"/>"#,
            r#"<c:crosses val="autoZero"/><c:crossBetween val="between"/></c:valAx>"#
        ),
        cat = CAT_AX_ID,
        val = VAL_AX_ID,
        cat_pos = cat_pos,
        val_pos = val_pos,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plot(style: ChartStyle) -> ChartPlot {
        ChartPlot {
            style,
            categories: vec!["Shield".into(), "Cinder <cone>".into()],
            series: vec![("Height".into(), vec![4.2, 0.3]), (String::new(), vec![1.0, f64::NAN])],
        }
    }

    #[test]
    fn names_map_to_chart_families() {
        let column = ChartStyle::from_name("COLUMN_STACKED").unwrap();
        assert_eq!((column.kind, column.grouping), (ChartKind::Column, Grouping::Stacked));
        assert_eq!(ChartStyle::from_name("bar").unwrap(), ChartStyle::DEFAULT);
        assert_eq!(ChartStyle::from_name("Bar Stacked 100").unwrap().grouping, Grouping::PercentStacked);
        assert!(ChartStyle::from_name("line_markers").unwrap().markers);
        assert_eq!(ChartStyle::from_name("doughnut").unwrap().kind, ChartKind::Pie);
        assert_eq!(ChartStyle::from_name("radar"), None);
    }

    #[test]
    fn bar_chart_has_series_and_axes() {
        let xml = chart_xml(&plot(ChartStyle::DEFAULT));
        assert!(xml.contains(r#"<c:barDir val="bar"/>"#));
        assert!(xml.contains(r#"<c:grouping val="clustered"/>"#));
        assert_eq!(xml.matches("<c:ser>").count(), 2);
        assert!(xml.contains("<c:v>Cinder &lt;cone&gt;</c:v>"));
        assert!(xml.contains("<c:v>Series 2</c:v>"));
        assert!(xml.contains("<c:catAx>") && xml.contains("<c:valAx>"));
        assert!(!xml.contains("NaN"));
    }

    #[test]
    fn pie_charts_have_no_axes() {
        let xml = chart_xml(&plot(ChartStyle::from_name("pie").unwrap()));
        assert!(xml.contains("<c:pieChart>"));
        assert!(!xml.contains("<c:catAx>"));
    }
}
