pub mod range_registry;
