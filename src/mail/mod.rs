pub mod api_client;
pub mod decoders;
pub mod formatter;
