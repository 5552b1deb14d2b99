pub mod auth;
pub mod jwt;
pub mod middleware;

#[cfg(test)]
pub mod testing;
