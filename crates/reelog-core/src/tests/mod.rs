mod common;

mod feed;
mod privacy;
