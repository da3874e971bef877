pub mod api;
pub mod content;
pub mod lesson;

pub use content::{
    BuildRequest, BuildResult, ChartData, ChartSeries, ContentMap, DEFAULT_TEMPLATE, GeneratedSlide, ImageRef,
    PlaceholderValue, SlideContent, TableData, TemplatePlan,
};
pub use lesson::{Duration, SlidePlan};
