use std::sync::Arc;

use glidepath_core::db::{create_pool, run_migrations};
use glidepath_core::rulesets::{
    ImportOptions, RuleSetRepository, RuleSetService, RuleSetServiceTrait,
};

const SAMPLE: &str = "gt-retire-age,lt-retire-age,Stocks,Bonds\n\
                      -100,0,70,30\n\
                      0,100,30,70\n";

#[test]
fn data_survives_pool_reopen_on_a_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("glidepath.db");
    let db_url = db_path.to_str().unwrap();

    {
        let pool = create_pool(db_url, 4).unwrap();
        let mut conn = pool.get().unwrap();
        run_migrations(&mut conn).unwrap();
        drop(conn);

        let service = RuleSetService::new(Arc::new(RuleSetRepository::new(pool)));
        let mut input = SAMPLE.as_bytes();
        service
            .import_rule_set(&mut input, "Persisted", ImportOptions::default())
            .unwrap();
    }

    let pool = create_pool(db_url, 4).unwrap();
    let mut conn = pool.get().unwrap();
    run_migrations(&mut conn).unwrap();
    drop(conn);

    let service = RuleSetService::new(Arc::new(RuleSetRepository::new(pool)));
    let rule_sets = service.get_rule_sets().unwrap();
    assert_eq!(rule_sets.len(), 1);
    assert_eq!(rule_sets[0].name, "Persisted");
    assert_eq!(service.get_rules(&rule_sets[0].id).unwrap().len(), 2);
}
