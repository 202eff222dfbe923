mod access;
mod assign;
mod binary;
mod unary;

pub(crate) use binary::to_numeric;
