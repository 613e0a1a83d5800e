pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS usage_ledger (
    namespace TEXT NOT NULL,
    key TEXT NOT NULL,
    value INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (namespace, key)
);
"#;
