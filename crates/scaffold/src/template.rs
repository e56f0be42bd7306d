//! 迁移脚本模板

const CREATE_PREFIX: &str = "create_";
const TABLE_SUFFIX: &str = "_table";

/// 从 `create_<table>[_table]` 形式的名称推导表名
///
/// `create_users_table` → `users`，`create_order_items` → `order_items`。
/// 名称不以 `create` 开头或剥离后为空时返回 `None`。
pub fn derive_table_name(name: &str) -> Option<&str> {
    let rest = name.strip_prefix(CREATE_PREFIX)?;
    let table = rest.strip_suffix(TABLE_SUFFIX).unwrap_or(rest);
    (!table.is_empty() && table != "table").then_some(table)
}

/// 渲染脚本内容
pub fn render(name: &str) -> String {
    match derive_table_name(name) {
        Some(table) => format!(
            "-- +migrate Up\n\
             CREATE TABLE {table} (\n    \
                 id INTEGER PRIMARY KEY AUTOINCREMENT,\n    \
                 created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,\n    \
                 updated_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP\n\
             );\n\
             \n\
             -- +migrate Down\n\
             DROP TABLE {table};\n"
        ),
        None => "-- +migrate Up\n-- 在此编写执行 SQL\n\n-- +migrate Down\n-- 在此编写回滚 SQL\n"
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_table_name() {
        assert_eq!(derive_table_name("create_users_table"), Some("users"));
        assert_eq!(derive_table_name("create_order_items"), Some("order_items"));
        assert_eq!(derive_table_name("create_table"), None);
        assert_eq!(derive_table_name("create"), None);
        assert_eq!(derive_table_name("create_timetable"), Some("timetable"));
        assert_eq!(derive_table_name("created_at_index"), None);
        assert_eq!(derive_table_name("add_email_to_users"), None);
    }

    #[test]
    fn test_render_create_template() {
        let content = render("create_users_table");
        assert!(content.starts_with("-- +migrate Up\nCREATE TABLE users (\n"));
        assert!(content.contains("    id INTEGER PRIMARY KEY AUTOINCREMENT,\n"));
        assert!(content.contains("-- +migrate Down\nDROP TABLE users;\n"));
    }

    #[test]
    fn test_render_skeleton() {
        let content = render("add_email_to_users");
        assert!(!content.contains("CREATE TABLE"));
        assert_eq!(content.matches("-- +migrate Up").count(), 1);
        assert_eq!(content.matches("-- +migrate Down").count(), 1);
    }
}
