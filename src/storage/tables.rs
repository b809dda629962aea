use redb::TableDefinition;

/// Tokens: token id -> Token (MessagePack)
pub const TOKENS: TableDefinition<&str, &[u8]> = TableDefinition::new("tokens");
