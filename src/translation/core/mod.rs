//! 远程翻译核心
//!
//! ```text
//! RemoteTranslator (service.rs)
//!     ├── TextCollector (pipeline/collector.rs)
//!     ├── create_batches (pipeline/batch.rs)
//!     ├── TranslationBackend (client.rs)
//!     ├── normalize_response (response.rs)
//!     └── StatusHandle (status.rs)
//! ```

pub mod service;

pub use service::{PassReport, RemoteTranslator, RemoteTranslatorConfig};
