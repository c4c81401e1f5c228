//! Core business logic abstractions

pub mod amount;
pub mod config;
pub mod currency;
pub mod forex;
pub mod form;
pub mod log;
pub mod page;
pub mod symbols;

// Re-export main types for cleaner imports
pub use currency::{CurrencyList, CurrencyRateProvider, RateSource, RateTable};
pub use forex::{Forex, ForexError};
pub use form::{
    BindError, ConversionClient, ConversionError, ConversionQuery, FormBridge, FormEvent,
    SubmitEvent, SubmitOutcome,
};
pub use page::{Element, MemoryPage, Page};
