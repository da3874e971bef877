pub mod builder;
pub mod catalog;
pub mod genai;
pub mod image_fetch;
pub mod image_search;
pub mod outline;
pub mod prompts;
pub mod slide_content;

pub use builder::PresentationBuilder;
pub use catalog::TemplateCatalog;
pub use genai::{GeminiClient, TextGenerator};
pub use image_fetch::{HttpImageFetcher, ImageFetcher};
pub use image_search::{ImageResolver, ImageSearch};
pub use outline::OutlineGenerator;
pub use slide_content::SlideContentGenerator;
