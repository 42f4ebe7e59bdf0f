pub mod balance;
pub mod notifier;
pub mod relay_engine;

#[cfg(test)]
pub(crate) mod test_support;
