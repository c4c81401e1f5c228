pub mod conversion_client;
pub mod exchangerate_host;
pub mod util;

pub use conversion_client::HttpConversionClient;
pub use exchangerate_host::ExchangeRateHostProvider;
