use super::*;

#[test]
fn test_parse_select() {
    let parser = SqlParser::hive();
    let stmts = parser
        .parse("SELECT id, name FROM users WHERE id = 1")
        .unwrap();
    assert_eq!(stmts.len(), 1);
}

#[test]
fn test_parse_multiple_statements() {
    let parser = SqlParser::generic();
    let stmts = parser.parse("SELECT 1; SELECT 2;").unwrap();
    assert_eq!(stmts.len(), 2);
}

#[test]
fn test_parse_empty() {
    let parser = SqlParser::hive();
    assert!(matches!(parser.parse(""), Err(SqlError::EmptySql)));
    assert!(matches!(parser.parse("  \n\t"), Err(SqlError::EmptySql)));
}

#[test]
fn test_parse_single_only_comment() {
    let parser = SqlParser::hive();
    assert!(matches!(
        parser.parse_single("-- nothing here\n"),
        Err(SqlError::EmptySql)
    ));
}

#[test]
fn test_parse_error() {
    let parser = SqlParser::hive();
    let result = parser.parse("SELECT FROM WHERE");
    assert!(matches!(result, Err(SqlError::ParseError { .. })));
}

#[test]
fn test_from_dialect_name() {
    for name in ["hive", "spark", "generic"] {
        let parser = SqlParser::from_dialect_name(name).unwrap();
        assert_eq!(parser.dialect_name(), name);
    }
    assert_eq!(
        SqlParser::from_dialect_name("HIVE").unwrap().dialect_name(),
        "hive"
    );

    let result = SqlParser::from_dialect_name("oracle");
    assert!(matches!(result, Err(SqlError::UnknownDialect(name)) if name == "oracle"));
}

#[test]
fn test_from_dialect() {
    assert_eq!(SqlParser::from_dialect(Dialect::Hive).dialect_name(), "hive");
    assert_eq!(SqlParser::from_dialect(Dialect::Spark).dialect_name(), "spark");
    assert_eq!(
        SqlParser::from_dialect(Dialect::Generic).dialect_name(),
        "generic"
    );
    assert_eq!(SqlParser::default().dialect_name(), "hive");
}
