//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Description                                         |
//! |------|-----------------------------------------------------|
//! | 0    | Success                                             |
//! | 1    | General error (unspecified)                         |
//! | 2    | CLI usage error (bad args, invalid option value)    |
//! | 3    | Join key or value field missing                     |
//! | 4    | Boundary is not a feature collection                |
//! | 5    | Matched value is not a number                       |
//! | 6    | Duplicate join key under `--on-duplicate error`     |
//! | 7    | Input file missing, unreadable or unparseable       |
//! | 8    | Output could not be written                         |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `CliError`

use geodash_enrich::EnrichError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, invalid option values.
/// clap also exits with 2 on parse failures.
pub const EXIT_USAGE: u8 = 2;

/// A feature lacks the join key, or a record lacks the key or value column.
pub const EXIT_MISSING_FIELD: u8 = 3;

/// The boundary is not a feature collection of feature objects.
pub const EXIT_MALFORMED: u8 = 4;

/// A matched record's value cannot be read as a number.
pub const EXIT_VALUE_COERCION: u8 = 5;

/// Two records share a join key and duplicates are fatal.
pub const EXIT_DUPLICATE_KEY: u8 = 6;

/// An input file is missing, unreadable, or cannot be parsed.
pub const EXIT_INPUT: u8 = 7;

/// The output file or stream could not be written.
pub const EXIT_OUTPUT: u8 = 8;

/// Map an engine error to its exit code.
pub fn enrich_exit_code(err: &EnrichError) -> u8 {
    match err {
        EnrichError::MissingField { .. } => EXIT_MISSING_FIELD,
        EnrichError::MalformedDocument(_) => EXIT_MALFORMED,
        EnrichError::ValueCoercion { .. } => EXIT_VALUE_COERCION,
        EnrichError::DuplicateKey { .. } => EXIT_DUPLICATE_KEY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geodash_enrich::FieldOwner;

    #[test]
    fn engine_errors_have_distinct_codes() {
        let codes = [
            enrich_exit_code(&EnrichError::MissingField {
                owner: FieldOwner::Feature(0),
                field: "NOMGEO".into(),
            }),
            enrich_exit_code(&EnrichError::MalformedDocument("x".into())),
            enrich_exit_code(&EnrichError::ValueCoercion {
                owner: FieldOwner::Record(0),
                field: "v".into(),
                value: "x".into(),
            }),
            enrich_exit_code(&EnrichError::DuplicateKey {
                key: "MERIDA".into(),
                first_record: 0,
                duplicate_record: 1,
            }),
        ];
        assert_eq!(codes, [3, 4, 5, 6]);
    }
}
