//! Input classification for user-supplied addresses.
//!
//! This module turns a raw string typed by the user into an absolute URL and
//! decides whether it names a single image (by file extension) or a page that
//! has to be scraped for image links.
//!
//! # Example
//!
//! ```
//! use ftcr_core::parser::{TargetKind, classify};
//!
//! assert_eq!(classify("example.com/gallery").unwrap().kind, TargetKind::Page);
//! assert_eq!(classify("example.com/x.PNG").unwrap().kind, TargetKind::Single);
//! ```

mod error;
mod url;

pub use error::{MAX_URL_LENGTH, ParseError};
pub use url::{
    Classification, ClassifyOptions, IMAGE_EXTENSIONS, Scheme, TargetKind, classify,
    classify_with, file_name_from_url, has_image_extension, path_extension,
};
