use clap::Parser;

use crate::error::{AppError, AppResult};

use super::CliArgs;

pub(crate) fn parse_test_args<I, T>(args: I) -> AppResult<CliArgs>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    CliArgs::try_parse_from(args).map_err(AppError::from)
}
