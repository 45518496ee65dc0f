use crate::hmm::HmmError;

pub type Result<T> = std::result::Result<T, String>;

impl From<HmmError> for String {
    fn from(err: HmmError) -> Self {
        err.to_string()
    }
}

pub fn handle_error_and_exit(err: String) -> ! {
    log::error!("{}", err);
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_failing_model() -> Result<()> {
        crate::hmm::flat_start(0, 2)?;
        Ok(())
    }

    #[test]
    fn engine_errors_convert_into_messages() {
        assert_eq!(
            build_failing_model(),
            Err("InvalidModel: model has no states".to_string())
        );
    }
}
