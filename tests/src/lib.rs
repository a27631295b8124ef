#[cfg(test)]
mod custom_rule;
#[cfg(test)]
mod serialization_deserialization;
