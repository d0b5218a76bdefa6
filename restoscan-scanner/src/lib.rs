pub mod error;
pub mod links;
pub mod protocol;
pub mod result;
pub mod scanner;
pub mod webscan;

pub use error::{Result, ScanError};
pub use result::ScanResult;
pub use scanner::PageScanner;
pub use webscan::{RestartPolicy, WebscanClient, WebscanConfig};
