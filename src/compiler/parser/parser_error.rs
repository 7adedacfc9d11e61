use anyhow::Error;

pub type ParseResult<T> = Result<T, Error>;
