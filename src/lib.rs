pub mod sim;
pub mod throttle;

#[cfg(test)]
mod test;
