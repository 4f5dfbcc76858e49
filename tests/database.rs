use std::fs;

use tabula_engine::persistence::{Database, DatabaseError, Value};
use tempfile::TempDir;

fn _specs(specs: Vec<&str>) -> Vec<String> {
    specs.iter().map(|spec| spec.to_string()).collect()
}

fn _values(values: Vec<&str>) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

fn _open_database(dir: &TempDir) -> Database {
    Database::open(dir.path()).expect("database should open on an empty directory")
}

fn _create_users(database: &mut Database) {
    database
        .create_table("users", &_specs(vec!["name:str", "age:int"]))
        .expect("valid column specs");
}

#[test]
fn create_table_prepends_id_column() {
    let dir = TempDir::new().unwrap();
    let mut database = _open_database(&dir);

    _create_users(&mut database);

    let table = database.get_table("users").unwrap();
    let names: Vec<&str> = table.columns().iter().map(|col| col.name.as_str()).collect();
    assert_eq!(names, vec!["ID", "name", "age"]);
}

#[test]
fn create_table_twice_fails_and_keeps_the_first_schema() {
    let dir = TempDir::new().unwrap();
    let mut database = _open_database(&dir);

    _create_users(&mut database);
    let result = database.create_table("users", &_specs(vec!["other:bool"]));

    assert!(matches!(result, Err(DatabaseError::TableExists(_))));

    let table = database.get_table("users").unwrap();
    let names: Vec<&str> = table.columns().iter().map(|col| col.name.as_str()).collect();
    assert_eq!(names, vec!["ID", "name", "age"]);
}

#[test]
fn create_table_with_bad_spec_creates_nothing() {
    let dir = TempDir::new().unwrap();
    let mut database = _open_database(&dir);

    let result = database.create_table("users", &_specs(vec!["name:str", "age:float"]));

    assert!(matches!(result, Err(DatabaseError::Validation(_))));
    assert!(!database.table_exists("users"));
}

#[test]
fn list_tables_is_sorted() {
    let dir = TempDir::new().unwrap();
    let mut database = _open_database(&dir);

    for table_name in ["zeta", "alpha", "mid"] {
        database
            .create_table(table_name, &_specs(vec!["x:int"]))
            .unwrap();
    }

    assert_eq!(database.list_tables(), vec!["alpha", "mid", "zeta"]);
}

#[test]
fn insert_assigns_monotonic_ids() {
    let dir = TempDir::new().unwrap();
    let mut database = _open_database(&dir);
    _create_users(&mut database);

    for (index, name) in ["Alice", "Bonega", "Jansen"].iter().enumerate() {
        let record = database
            .insert("users", &_values(vec![name, "30"]))
            .unwrap();
        assert_eq!(record.id(), Some(index as i64 + 1));
    }
}

#[test]
fn insert_after_deleting_the_max_id_reuses_it() {
    let dir = TempDir::new().unwrap();
    let mut database = _open_database(&dir);
    _create_users(&mut database);

    for name in ["Alice", "Bonega", "Jansen"] {
        database.insert("users", &_values(vec![name, "30"])).unwrap();
    }

    database.delete("users", "ID", "3").unwrap();

    let record = database
        .insert("users", &_values(vec!["Malaika", "25"]))
        .unwrap();
    assert_eq!(record.id(), Some(3));
}

#[test]
fn insert_with_wrong_value_count_fails() {
    let dir = TempDir::new().unwrap();
    let mut database = _open_database(&dir);
    _create_users(&mut database);

    let result = database.insert("users", &_values(vec!["Alice"]));

    assert!(matches!(result, Err(DatabaseError::Validation(_))));
    assert_eq!(database.select("users", None, None).unwrap().len(), 0);
}

#[test]
fn insert_with_bad_value_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let mut database = _open_database(&dir);
    _create_users(&mut database);

    let result = database.insert("users", &_values(vec!["Alice", "not-a-number"]));

    assert!(matches!(result, Err(DatabaseError::Validation(_))));
    assert_eq!(database.select("users", None, None).unwrap().len(), 0);
}

#[test]
fn insert_into_missing_table_fails() {
    let dir = TempDir::new().unwrap();
    let mut database = _open_database(&dir);

    let result = database.insert("ghosts", &_values(vec!["boo"]));

    assert!(matches!(result, Err(DatabaseError::TableNotFound(_))));
}

#[test]
fn records_survive_a_reload_field_for_field() {
    let dir = TempDir::new().unwrap();

    {
        let mut database = _open_database(&dir);
        _create_users(&mut database);
        database
            .insert("users", &_values(vec!["Alice", "30"]))
            .unwrap();
        database
            .insert("users", &_values(vec!["Bonega", "41"]))
            .unwrap();
    }

    let mut database = _open_database(&dir);
    let records = database.select("users", None, None).unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id(), Some(1));
    assert_eq!(
        records[0].get("name"),
        Some(&Value::Str("Alice".to_string()))
    );
    assert_eq!(records[0].get("age"), Some(&Value::Int(30)));
    assert_eq!(records[1].id(), Some(2));
    assert_eq!(records[1].get("age"), Some(&Value::Int(41)));
}

#[test]
fn schema_column_order_survives_a_reload() {
    let dir = TempDir::new().unwrap();

    {
        let mut database = _open_database(&dir);
        database
            .create_table("ordered", &_specs(vec!["b:int", "a:str"]))
            .unwrap();
    }

    let database = _open_database(&dir);
    let table = database.get_table("ordered").unwrap();
    let names: Vec<&str> = table.columns().iter().map(|col| col.name.as_str()).collect();
    assert_eq!(names, vec!["ID", "b", "a"]);
}

#[test]
fn select_filters_by_exact_typed_equality() {
    let dir = TempDir::new().unwrap();
    let mut database = _open_database(&dir);
    database
        .create_table("mixed", &_specs(vec!["flag:bool", "n:int"]))
        .unwrap();

    database.insert("mixed", &_values(vec!["yes", "1"])).unwrap();
    database.insert("mixed", &_values(vec!["no", "2"])).unwrap();

    // "1" against the bool column means true, and matches the bool field
    let by_flag = database.select("mixed", Some("flag"), Some("1")).unwrap();
    assert_eq!(by_flag.len(), 1);
    assert_eq!(by_flag[0].get("flag"), Some(&Value::Bool(true)));

    // "1" against the int column means the integer 1
    let by_n = database.select("mixed", Some("n"), Some("1")).unwrap();
    assert_eq!(by_n.len(), 1);
    assert_eq!(by_n[0].get("n"), Some(&Value::Int(1)));
}

#[test]
fn select_with_unknown_column_fails() {
    let dir = TempDir::new().unwrap();
    let mut database = _open_database(&dir);
    _create_users(&mut database);

    let result = database.select("users", Some("height"), Some("180"));

    assert!(matches!(result, Err(DatabaseError::Validation(_))));
}

#[test]
fn select_on_missing_table_fails() {
    let dir = TempDir::new().unwrap();
    let mut database = _open_database(&dir);

    let result = database.select("ghosts", None, None);

    assert!(matches!(result, Err(DatabaseError::TableNotFound(_))));
}

#[test]
fn repeated_select_is_served_from_the_cache() {
    let dir = TempDir::new().unwrap();
    let mut database = _open_database(&dir);
    _create_users(&mut database);
    database
        .insert("users", &_values(vec!["Alice", "30"]))
        .unwrap();

    let first = database.select("users", Some("age"), Some("30")).unwrap();
    assert_eq!(first.len(), 1);

    // pull the file out from under the engine; a cached result must not
    // touch the row store again
    fs::remove_file(dir.path().join("users.json")).unwrap();

    let second = database.select("users", Some("age"), Some("30")).unwrap();
    assert_eq!(second, first);
}

#[test]
fn any_write_invalidates_cached_results_of_other_tables() {
    let dir = TempDir::new().unwrap();
    let mut database = _open_database(&dir);
    _create_users(&mut database);
    database
        .insert("users", &_values(vec!["Alice", "30"]))
        .unwrap();
    database
        .create_table("logs", &_specs(vec!["line:str"]))
        .unwrap();

    let cached = database.select("users", None, None).unwrap();
    assert_eq!(cached.len(), 1);

    fs::remove_file(dir.path().join("users.json")).unwrap();

    // a write to an unrelated table clears every cached result, so the
    // next select re-reads the (now missing) file and sees zero records
    database.insert("logs", &_values(vec!["hello"])).unwrap();

    let reloaded = database.select("users", None, None).unwrap();
    assert_eq!(reloaded.len(), 0);
}

#[test]
fn update_rewrites_matching_records_in_place() {
    let dir = TempDir::new().unwrap();
    let mut database = _open_database(&dir);
    _create_users(&mut database);

    for (name, age) in [("Alice", "30"), ("Bonega", "30"), ("Jansen", "41")] {
        database.insert("users", &_values(vec![name, age])).unwrap();
    }

    let outcome = database.update("users", "age", "31", "age", "30").unwrap();

    assert_eq!(outcome.updated_count, 2);
    assert_eq!(outcome.updated_ids, vec![1, 2]);

    let records = database.select("users", Some("age"), Some("31")).unwrap();
    assert_eq!(records.len(), 2);
}

#[test]
fn update_matching_nothing_leaves_the_file_untouched() {
    let dir = TempDir::new().unwrap();
    let mut database = _open_database(&dir);
    _create_users(&mut database);
    database
        .insert("users", &_values(vec!["Alice", "30"]))
        .unwrap();

    let before = fs::read(dir.path().join("users.json")).unwrap();

    let result = database.update("users", "age", "31", "age", "99");
    assert!(matches!(result, Err(DatabaseError::RecordNotFound { .. })));

    let after = fs::read(dir.path().join("users.json")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn update_of_the_id_column_is_rejected() {
    let dir = TempDir::new().unwrap();
    let mut database = _open_database(&dir);
    _create_users(&mut database);
    database
        .insert("users", &_values(vec!["Alice", "30"]))
        .unwrap();

    let result = database.update("users", "ID", "9", "age", "30");

    assert!(matches!(result, Err(DatabaseError::Validation(_))));
}

#[test]
fn delete_keeps_survivors_in_their_original_order() {
    let dir = TempDir::new().unwrap();
    let mut database = _open_database(&dir);
    _create_users(&mut database);

    for (name, age) in [("Alice", "30"), ("Bonega", "41"), ("Jansen", "30")] {
        database.insert("users", &_values(vec![name, age])).unwrap();
    }

    let outcome = database.delete("users", "age", "30").unwrap();

    assert_eq!(outcome.deleted_count, 2);
    assert_eq!(outcome.deleted_ids, vec![1, 3]);

    let survivors = database.select("users", None, None).unwrap();
    assert_eq!(survivors.len(), 1);
    assert_eq!(survivors[0].id(), Some(2));
}

#[test]
fn delete_matching_nothing_leaves_the_file_untouched() {
    let dir = TempDir::new().unwrap();
    let mut database = _open_database(&dir);
    _create_users(&mut database);
    database
        .insert("users", &_values(vec!["Alice", "30"]))
        .unwrap();

    let before = fs::read(dir.path().join("users.json")).unwrap();

    let result = database.delete("users", "age", "99");
    assert!(matches!(result, Err(DatabaseError::RecordNotFound { .. })));

    let after = fs::read(dir.path().join("users.json")).unwrap();
    assert_eq!(before, after);
}

#[test]
fn drop_table_removes_schema_and_data_file() {
    let dir = TempDir::new().unwrap();
    let mut database = _open_database(&dir);
    _create_users(&mut database);
    database
        .insert("users", &_values(vec!["Alice", "30"]))
        .unwrap();

    database.drop_table("users").unwrap();

    assert!(!database.table_exists("users"));
    assert!(!dir.path().join("users.json").exists());
    assert!(matches!(
        database.get_table("users"),
        Err(DatabaseError::TableNotFound(_))
    ));
}

#[test]
fn drop_of_a_missing_table_fails() {
    let dir = TempDir::new().unwrap();
    let mut database = _open_database(&dir);

    let result = database.drop_table("ghosts");

    assert!(matches!(result, Err(DatabaseError::TableNotFound(_))));
}

#[test]
fn table_info_reports_columns_and_record_count() {
    let dir = TempDir::new().unwrap();
    let mut database = _open_database(&dir);
    _create_users(&mut database);
    database
        .insert("users", &_values(vec!["Alice", "30"]))
        .unwrap();

    let info = database.table_info("users").unwrap();

    assert_eq!(info.name, "users");
    assert_eq!(info.record_count, 1);
    let names: Vec<&str> = info.columns.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, vec!["ID", "name", "age"]);
}

#[test]
fn the_full_users_scenario_behaves_end_to_end() {
    let dir = TempDir::new().unwrap();
    let mut database = _open_database(&dir);

    _create_users(&mut database);

    let record = database
        .insert("users", &_values(vec!["\"Alice\"", "30"]))
        .unwrap();
    assert_eq!(record.id(), Some(1));
    assert_eq!(record.get("name"), Some(&Value::Str("Alice".to_string())));
    assert_eq!(record.get("age"), Some(&Value::Int(30)));

    let thirty = database.select("users", Some("age"), Some("30")).unwrap();
    assert_eq!(thirty.len(), 1);
    assert_eq!(thirty[0].id(), Some(1));

    let updated = database
        .update("users", "age", "31", "name", "Alice")
        .unwrap();
    assert_eq!(updated.updated_count, 1);
    assert_eq!(updated.updated_ids, vec![1]);

    let deleted = database.delete("users", "age", "31").unwrap();
    assert_eq!(deleted.deleted_count, 1);

    let remaining = database.select("users", None, None).unwrap();
    assert!(remaining.is_empty());
}
