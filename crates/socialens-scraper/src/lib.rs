pub mod chain;
pub mod client;
pub mod engine;
pub mod error;
pub mod narrative;
pub mod orchestrator;
pub mod platform;
pub mod structural;
pub mod validate;

pub use chain::{ChainSettings, FetchAttempt, FetchChain, FetchResult, MethodUsed, StrategyId};
pub use client::{FetchedPage, HttpFetcher, PageFetcher, RequestProfile};
pub use engine::{AccessibilityNote, AcquisitionEngine, AcquisitionReport, SummarySource};
pub use error::FetchError;
pub use orchestrator::{FetchBatch, FetchOrchestrator};
pub use platform::{classify, Platform, UrlDescriptor};
pub use structural::{analyze_url, ActivityLevel, ContentType, StructuralAnalysis};
pub use validate::{validate_content, ContentVerdict, Validity};
