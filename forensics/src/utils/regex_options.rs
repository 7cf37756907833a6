use super::error::UtilError;
use log::error;
use regex::{Regex, RegexBuilder};

/// Create a compiled Regex
pub(crate) fn create_regex(input: &str) -> Result<Regex, UtilError> {
    let regex_result = Regex::new(input);
    let regex = match regex_result {
        Ok(result) => result,
        Err(err) => {
            error!("[wipetrace] Bad regex {input}, error: {err:?}");
            return Err(UtilError::Regex);
        }
    };

    Ok(regex)
}

/// Create a compiled case insensitive Regex
pub(crate) fn create_regex_ignore_case(input: &str) -> Result<Regex, UtilError> {
    let regex_result = RegexBuilder::new(input).case_insensitive(true).build();
    match regex_result {
        Ok(result) => Ok(result),
        Err(err) => {
            error!("[wipetrace] Bad regex {input}, error: {err:?}");
            Err(UtilError::Regex)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::utils::regex_options::{create_regex, create_regex_ignore_case};

    #[test]
    fn test_create_regex() {
        let regex = create_regex(r"factory_reset,(\d{10,})").unwrap();
        assert!(regex.is_match("reboot,factory_reset,1689128778"));
    }

    #[test]
    fn test_create_regex_ignore_case() {
        let regex = create_regex_ignore_case(r"setup.*wizard").unwrap();
        assert!(regex.is_match("com.google.android.SetupWizard"));
    }

    #[test]
    fn test_bad_regex() {
        assert!(create_regex(r"(unclosed").is_err());
    }
}
