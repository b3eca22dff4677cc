use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

use glidepath_core::db::DbPool;
use glidepath_core::errors::{Error, ImportError};
use glidepath_core::portfolio::{
    PortfolioDraft, PortfolioRepository, PortfolioRepositoryTrait, PortfolioService,
    PortfolioServiceTrait,
};
use glidepath_core::positions::{PositionRepository, PositionService, PositionServiceTrait};
use rust_decimal_macros::dec;

mod common;

const USER: &str = "user-1";

const FIDELITY_CSV: &str = "Account Number,Account Name,Symbol,Description,Quantity,Last Price,Last Price Change,Current Value,Today's Gain/Loss Dollar,Today's Gain/Loss Percent,Total Gain/Loss Dollar,Total Gain/Loss Percent,Percent Of Account,Cost Basis Total,Average Cost Basis,Type\n\
X111,Brokerage,SPY,SPDR S&P 500,10.5,$450.00,$1.20,\"$4,725.00\",$12.60,+0.27%,\"$1,000.00\",+26.84%,60%,\"$3,725.00\",$354.76,Cash\n\
X111,Brokerage,FCASH**,Held in cash,100,$1.00,$0.00,$100.00,$0.00,0.00%,$0.00,0.00%,1.3%,$100.00,$1.00,Cash\n\
X222,IRA,BND,Vanguard Total Bond,20,$72.50,-$0.10,\"$1,450.00\",-$2.00,-0.14%,$50.00,+3.57%,100%,\"$1,400.00\",$70.00,Cash\n\
\n\
\"Date downloaded Nov-08-2025 7:54 p.m ET\"\n";

fn setup() -> (
    Arc<DbPool>,
    PositionService<PositionRepository>,
    Arc<PositionRepository>,
) {
    let pool = common::test_pool();
    let repo = Arc::new(PositionRepository::new(pool.clone()));
    (pool.clone(), PositionService::new(repo.clone()), repo)
}

fn import(
    service: &PositionService<PositionRepository>,
    csv: &str,
    filename: &str,
) -> glidepath_core::Result<glidepath_core::positions::AccountUpload> {
    let mut input = csv.as_bytes();
    service.import_fidelity_positions(&mut input, USER, filename)
}

#[test]
fn fidelity_import_persists_raw_position_strings() {
    let (_pool, service, _repo) = setup();
    let upload = import(&service, FIDELITY_CSV, "positions.csv").unwrap();
    assert_eq!(upload.entry_count, 3);
    assert_eq!(upload.file_datetime, "Date downloaded Nov-08-2025 7:54 p.m ET");

    let positions = service.get_positions(&upload.id).unwrap();
    assert_eq!(positions.len(), 3);

    let spy = positions.iter().find(|p| p.symbol == "SPY").unwrap();
    assert_eq!(spy.current_value, "$4,725.00");
    assert_eq!(spy.quantity, "10.5");
    assert_eq!(spy.position_type, "Cash");

    // "FCASH**" is normalized to "FCASH".
    assert!(positions.iter().any(|p| p.symbol == "FCASH"));
}

#[test]
fn reimporting_the_same_filename_replaces_the_upload() {
    let (_pool, service, _repo) = setup();
    let first = import(&service, FIDELITY_CSV, "positions.csv").unwrap();

    let smaller = "Account Number,Account Name,Symbol,Description,Current Value\n\
                   X111,Brokerage,SPY,SPDR S&P 500,\"$5,000.00\"\n";
    sleep(Duration::from_millis(5));
    let second = import(&service, smaller, "positions.csv").unwrap();

    let uploads = service.get_uploads(USER).unwrap();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].id, second.id);
    assert_eq!(uploads[0].entry_count, 1);
    assert!(service.get_positions(&first.id).unwrap().is_empty());
}

#[test]
fn empty_or_rowless_files_are_rejected() {
    let (_pool, service, _repo) = setup();

    let result = import(&service, "", "empty.csv");
    assert!(matches!(
        result,
        Err(Error::Import(ImportError::MalformedInput(_)))
    ));

    let headers_only = "Account Number,Symbol,Current Value\n";
    let result = import(&service, headers_only, "headers.csv");
    assert!(matches!(
        result,
        Err(Error::Import(ImportError::MalformedInput(_)))
    ));
    assert!(service.get_uploads(USER).unwrap().is_empty());
}

#[test]
fn deleting_an_upload_removes_its_positions() {
    let (_pool, service, _repo) = setup();
    let upload = import(&service, FIDELITY_CSV, "positions.csv").unwrap();
    assert_eq!(service.delete_upload(&upload.id).unwrap(), 1);
    assert!(service.get_uploads(USER).unwrap().is_empty());
    assert!(service.get_positions(&upload.id).unwrap().is_empty());
}

#[test]
fn analysis_rolls_up_by_class_and_category_with_unknown_bucket() {
    let (pool, position_service, position_repo) = setup();
    import(&position_service, FIDELITY_CSV, "positions.csv").unwrap();

    let portfolio_repo = Arc::new(PortfolioRepository::new(pool.clone()));
    let portfolio_service = PortfolioService::new(portfolio_repo.clone(), position_repo);

    let portfolio = portfolio_service
        .create_portfolio(PortfolioDraft {
            user_id: USER.to_string(),
            name: "Retirement".to_string(),
            year_born: 1985,
            retirement_age: 65,
            rule_set_id: None,
        })
        .unwrap();
    portfolio_service
        .add_item(&portfolio.id, "X111", "SPY")
        .unwrap();
    portfolio_service
        .add_item(&portfolio.id, "X222", "BND")
        .unwrap();

    portfolio_repo
        .upsert_fund("SPY", "SPDR S&P 500", "Stocks", "Large Cap", 1)
        .unwrap();

    let analysis = portfolio_service
        .get_portfolio_analysis(&portfolio.id)
        .unwrap();
    assert_eq!(analysis.total_value, dec!(6175));
    assert_eq!(analysis.class_breakdown["Stocks"], dec!(4725));
    // BND has no fund reference data, so it lands in the Unknown bucket.
    assert_eq!(analysis.class_breakdown["Unknown"], dec!(1450));
    assert_eq!(analysis.category_breakdown["Large Cap"], dec!(4725));
    assert_eq!(analysis.ticker_breakdown["SPY"], dec!(4725));
    assert_eq!(analysis.ticker_breakdown["BND"], dec!(1450));

    let large_cap = analysis
        .category_details
        .iter()
        .find(|d| d.category == "Large Cap")
        .unwrap();
    assert_eq!(large_cap.asset_class, "Stocks");
    assert_eq!(large_cap.subtotal, dec!(4725));
}

#[test]
fn analysis_uses_only_the_latest_upload_per_account() {
    let (pool, position_service, position_repo) = setup();
    let older = "Account Number,Account Name,Symbol,Description,Current Value\n\
                 X111,Brokerage,SPY,SPDR S&P 500,\"$1,000.00\"\n";
    let newer = "Account Number,Account Name,Symbol,Description,Current Value\n\
                 X111,Brokerage,SPY,SPDR S&P 500,\"$2,000.00\"\n";
    import(&position_service, older, "monday.csv").unwrap();
    sleep(Duration::from_millis(5));
    import(&position_service, newer, "tuesday.csv").unwrap();

    let portfolio_repo = Arc::new(PortfolioRepository::new(pool.clone()));
    let portfolio_service = PortfolioService::new(portfolio_repo, position_repo);
    let portfolio = portfolio_service
        .create_portfolio(PortfolioDraft {
            user_id: USER.to_string(),
            name: "Retirement".to_string(),
            year_born: 1985,
            retirement_age: 65,
            rule_set_id: None,
        })
        .unwrap();
    portfolio_service
        .add_item(&portfolio.id, "X111", "SPY")
        .unwrap();

    let analysis = portfolio_service
        .get_portfolio_analysis(&portfolio.id)
        .unwrap();
    assert_eq!(analysis.total_value, dec!(2000));
}

#[test]
fn analysis_serializes_with_camel_case_keys() {
    let (pool, position_service, position_repo) = setup();
    import(&position_service, FIDELITY_CSV, "positions.csv").unwrap();

    let portfolio_repo = Arc::new(PortfolioRepository::new(pool.clone()));
    let portfolio_service = PortfolioService::new(portfolio_repo.clone(), position_repo);
    let portfolio = portfolio_service
        .create_portfolio(PortfolioDraft {
            user_id: USER.to_string(),
            name: "Retirement".to_string(),
            year_born: 1985,
            retirement_age: 65,
            rule_set_id: None,
        })
        .unwrap();
    portfolio_service
        .add_item(&portfolio.id, "X111", "SPY")
        .unwrap();
    portfolio_repo
        .upsert_fund("SPY", "SPDR S&P 500", "Stocks", "Large Cap", 1)
        .unwrap();

    let analysis = portfolio_service
        .get_portfolio_analysis(&portfolio.id)
        .unwrap();
    let json = serde_json::to_value(&analysis).unwrap();
    assert!(json.get("classBreakdown").is_some());
    assert!(json.get("categoryBreakdown").is_some());
    assert!(json.get("tickerBreakdown").is_some());
    assert!(json.get("totalValue").is_some());
    let detail = &json["categoryDetails"][0];
    assert_eq!(detail["category"], "Large Cap");
    assert!(detail.get("assetClass").is_some());
    assert!(detail["symbols"][0].get("ticker").is_some());
}

#[test]
fn analysis_of_an_empty_portfolio_is_empty() {
    let (pool, _service, position_repo) = setup();
    let portfolio_repo = Arc::new(PortfolioRepository::new(pool.clone()));
    let portfolio_service = PortfolioService::new(portfolio_repo, position_repo);
    let portfolio = portfolio_service
        .create_portfolio(PortfolioDraft {
            user_id: USER.to_string(),
            name: "Empty".to_string(),
            year_born: 1990,
            retirement_age: 67,
            rule_set_id: None,
        })
        .unwrap();

    let analysis = portfolio_service
        .get_portfolio_analysis(&portfolio.id)
        .unwrap();
    assert_eq!(analysis.total_value, rust_decimal::Decimal::ZERO);
    assert!(analysis.class_breakdown.is_empty());
    assert!(analysis.category_details.is_empty());
}
