#[cfg(test)]
mod deflate;
pub mod end_to_end;
#[cfg(test)]
mod gz;
pub mod helpers;
#[cfg(test)]
mod stateless;
