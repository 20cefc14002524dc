pub mod ping_processor;
