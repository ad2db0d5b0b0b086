//! End-to-end Q5 scenarios over tiny hand-built datasets.
//!
//! Each scenario runs twice: once against in-memory tables and once through
//! dbgen-style `.tbl` files in a temporary directory, so the loader, the
//! executor and the result writer are exercised together.

use query5::output::write_results;
use query5::tpch::{Customer, LineItem, Nation, Order, Region, Supplier};
use query5::{
    ExecutionConfig, ExecutionContext, Partitioning, Query5Params, QueryError, TableFormat,
    TpchTables,
};
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::tempdir;

fn params_1995() -> Query5Params {
    Query5Params::try_new("ASIA", "1995-01-01", "1996-01-01").unwrap()
}

/// ASIA holds INDONESIA and CHINA; one INDONESIA customer buys from one
/// INDONESIA supplier in February 1995.
fn indonesia_tables() -> TpchTables {
    TpchTables {
        region: vec![
            Region {
                regionkey: 2,
                name: "ASIA".to_string(),
            },
            Region {
                regionkey: 3,
                name: "EUROPE".to_string(),
            },
        ],
        nation: vec![
            Nation {
                nationkey: 9,
                name: "INDONESIA".to_string(),
                regionkey: 2,
            },
            Nation {
                nationkey: 18,
                name: "CHINA".to_string(),
                regionkey: 2,
            },
            Nation {
                nationkey: 6,
                name: "FRANCE".to_string(),
                regionkey: 3,
            },
        ],
        customer: vec![Customer {
            custkey: 100,
            nationkey: 9,
        }],
        supplier: vec![Supplier {
            suppkey: 200,
            nationkey: 9,
        }],
        orders: vec![Order {
            orderkey: 500,
            custkey: 100,
            orderdate: "1995-02-15".to_string(),
        }],
        lineitem: vec![LineItem {
            orderkey: 500,
            suppkey: 200,
            extendedprice: 1000.00,
            discount: 0.05,
        }],
    }
}

fn run(tables: TpchTables, params: &Query5Params, threads: usize) -> query5::QueryResult {
    let mut ctx = ExecutionContext::new().with_config(ExecutionConfig::try_new(threads).unwrap());
    ctx.register_tables(tables);
    ctx.query5(params).unwrap()
}

fn result_file(rows: &[query5::NationRevenue]) -> String {
    let dir = tempdir().unwrap();
    let path = dir.path().join("result.txt");
    write_results(&path, rows).unwrap();
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_matching_nation_earns_discounted_revenue() {
    let result = run(indonesia_tables(), &params_1995(), 1);

    assert_eq!(result.row_count(), 1);
    assert_eq!(result.rows[0].nation, "INDONESIA");
    assert!((result.rows[0].revenue - 950.0).abs() < 1e-9);
    assert_eq!(result_file(&result.rows), "INDONESIA|950.0000\n");
}

#[test]
fn test_same_answer_for_any_thread_count() {
    for threads in [1, 2, 4, 16] {
        let result = run(indonesia_tables(), &params_1995(), threads);
        assert_eq!(result_file(&result.rows), "INDONESIA|950.0000\n");
    }
}

#[test]
fn test_customer_and_supplier_in_different_nations() {
    let mut tables = indonesia_tables();
    tables.supplier[0].nationkey = 18;

    let result = run(tables, &params_1995(), 2);
    assert_eq!(result.row_count(), 0);
    assert_eq!(result.stats.lineitems_matched, 0);
    assert_eq!(result_file(&result.rows), "");
}

#[test]
fn test_order_outside_interval_is_excluded() {
    let mut tables = indonesia_tables();
    tables.orders[0].orderdate = "1996-03-01".to_string();

    let result = run(tables, &params_1995(), 2);
    assert!(result.rows.is_empty());
    assert_eq!(result.stats.filter.orders, 0);
}

#[test]
fn test_interval_is_half_open() {
    let mut tables = indonesia_tables();

    tables.orders[0].orderdate = "1995-01-01".to_string();
    assert_eq!(run(tables.clone(), &params_1995(), 1).row_count(), 1);

    tables.orders[0].orderdate = "1996-01-01".to_string();
    assert_eq!(run(tables, &params_1995(), 1).row_count(), 0);
}

#[test]
fn test_unknown_region_is_an_empty_success() {
    let params = Query5Params::try_new("ATLANTIS", "1995-01-01", "1996-01-01").unwrap();
    let result = run(indonesia_tables(), &params, 3);

    assert_eq!(result.row_count(), 0);
    assert_eq!(result.stats.filter.regions, 0);
    assert_eq!(result.stats.filter.nations, 0);
    assert_eq!(result_file(&result.rows), "");
}

#[test]
fn test_supplier_outside_region_does_not_count() {
    let mut tables = indonesia_tables();
    // Customer and supplier agree, but FRANCE is not in ASIA
    tables.customer[0].nationkey = 6;
    tables.supplier[0].nationkey = 6;

    let result = run(tables, &params_1995(), 1);
    assert!(result.rows.is_empty());
}

#[test]
fn test_ranking_and_accumulation() {
    let mut tables = indonesia_tables();
    tables.customer.push(Customer {
        custkey: 101,
        nationkey: 18,
    });
    tables.supplier.push(Supplier {
        suppkey: 201,
        nationkey: 18,
    });
    tables.orders.push(Order {
        orderkey: 501,
        custkey: 101,
        orderdate: "1995-06-30".to_string(),
    });
    // Two CHINA lines: 600 + 500 = 1100, ahead of INDONESIA's 950
    tables.lineitem.push(LineItem {
        orderkey: 501,
        suppkey: 201,
        extendedprice: 600.00,
        discount: 0.0,
    });
    tables.lineitem.push(LineItem {
        orderkey: 501,
        suppkey: 201,
        extendedprice: 500.00,
        discount: 0.0,
    });
    // Cross-nation line on the same order, ignored
    tables.lineitem.push(LineItem {
        orderkey: 501,
        suppkey: 200,
        extendedprice: 10_000.00,
        discount: 0.0,
    });

    let config = ExecutionConfig::try_new(2)
        .unwrap()
        .with_partitioning(Partitioning::Morsel { morsel_size: 1 })
        .unwrap();
    let mut ctx = ExecutionContext::new().with_config(config);
    ctx.register_tables(tables);
    let result = ctx.query5(&params_1995()).unwrap();

    assert_eq!(result.stats.partitions, 4);
    assert_eq!(result.stats.lineitems_matched, 3);
    assert_eq!(
        result_file(&result.rows),
        "CHINA|1100.0000\nINDONESIA|950.0000\n"
    );
}

fn write_indonesia_tbl(dir: &Path) {
    let files = [
        (
            "region.tbl",
            "0|AFRICA|lar deposits. blithely final packages cajole|\n\
             2|ASIA|ges. thinly even pinto beans ca|\n\
             3|EUROPE|ly final courts cajole furiously final excuse|\n",
        ),
        (
            "nation.tbl",
            "6|FRANCE|3|refully final requests. regular, ironi|\n\
             9|INDONESIA|2| slyly express asymptotes. regular deposits haggle|\n\
             18|CHINA|2|c dependencies. furiously express notornis sleep|\n",
        ),
        (
            "customer.tbl",
            "100|Customer#000000100|fptUABXcmkC5Wx|9|19-141-291-4312|9889.89|BUILDING|furiously|\n",
        ),
        (
            "supplier.tbl",
            "200|Supplier#000000200|MNgIS6ExcdVTOZKFqbZdp|9|19-247-876-4142|6734.07|blithely even|\n",
        ),
        (
            "orders.tbl",
            "500|100|O|1009.89|1995-02-15|1-URGENT|Clerk#000000951|0|nstructions sleep|\n",
        ),
        (
            "lineitem.tbl",
            "500|1552|200|1|17|1000.00|0.05|0.02|N|O|1995-03-13|1995-02-12|1995-03-22|DELIVER IN PERSON|TRUCK|egular courts above the|\n\
             500|1552|200\n",
        ),
    ];
    for (name, contents) in files {
        fs::write(dir.join(name), contents).unwrap();
    }
}

#[test]
fn test_scenario_through_tbl_files() {
    let dir = tempdir().unwrap();
    write_indonesia_tbl(dir.path());

    let mut ctx = ExecutionContext::new().with_config(ExecutionConfig::try_new(4).unwrap());
    ctx.load_tables(dir.path(), TableFormat::Tbl).unwrap();

    // The truncated line item is skipped
    assert_eq!(ctx.tables().lineitem.len(), 1);
    assert_eq!(ctx.tables().region.len(), 3);

    let result = ctx.query5(&params_1995()).unwrap();
    let out = dir.path().join("result.txt");
    write_results(&out, &result.rows).unwrap();
    assert_eq!(fs::read_to_string(out).unwrap(), "INDONESIA|950.0000\n");
}

#[test]
fn test_missing_relation_fails_the_load() {
    let dir = tempdir().unwrap();
    write_indonesia_tbl(dir.path());
    fs::remove_file(dir.path().join("supplier.tbl")).unwrap();

    let mut ctx = ExecutionContext::new();
    let err = ctx.load_tables(dir.path(), TableFormat::Tbl).unwrap_err();
    assert!(matches!(err, QueryError::TableAccess { .. }));
}

#[test]
fn test_malformed_key_fails_the_load() {
    let dir = tempdir().unwrap();
    write_indonesia_tbl(dir.path());
    fs::write(
        dir.path().join("orders.tbl"),
        "5x0|100|O|1009.89|1995-02-15|1-URGENT|Clerk#000000951|0|nstructions sleep|\n",
    )
    .unwrap();

    let mut ctx = ExecutionContext::new();
    let err = ctx.load_tables(dir.path(), TableFormat::Tbl).unwrap_err();
    match err {
        QueryError::InvalidField { table, column, .. } => {
            assert_eq!(table, "orders");
            assert_eq!(column, "o_orderkey");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_cli_run_writes_result_file() {
    let dir = tempdir().unwrap();
    write_indonesia_tbl(dir.path());
    let out = dir.path().join("result.txt");

    let status = Command::new(env!("CARGO_BIN_EXE_query5"))
        .args(["run", "--r_name", "ASIA"])
        .args(["--start_date", "1995-01-01", "--end_date", "1996-01-01"])
        .args(["--threads", "3"])
        .arg("--table_path")
        .arg(dir.path())
        .arg("--result_path")
        .arg(&out)
        .status()
        .unwrap();

    assert!(status.success());
    assert_eq!(fs::read_to_string(out).unwrap(), "INDONESIA|950.0000\n");
}

#[test]
fn test_cli_rejects_bad_parameters() {
    let dir = tempdir().unwrap();
    write_indonesia_tbl(dir.path());
    let out = dir.path().join("result.txt");

    for (threads, start) in [("0", "1995-01-01"), ("2", "1995-1-1")] {
        let status = Command::new(env!("CARGO_BIN_EXE_query5"))
            .args(["run", "--r_name", "ASIA", "--threads", threads])
            .args(["--start_date", start, "--end_date", "1996-01-01"])
            .arg("--table_path")
            .arg(dir.path())
            .arg("--result_path")
            .arg(&out)
            .status()
            .unwrap();

        assert!(!status.success());
        assert!(!out.exists());
    }
}

#[test]
fn test_cli_requires_thread_count() {
    let dir = tempdir().unwrap();
    write_indonesia_tbl(dir.path());
    let out = dir.path().join("result.txt");

    let status = Command::new(env!("CARGO_BIN_EXE_query5"))
        .args(["run", "--r_name", "ASIA"])
        .args(["--start_date", "1995-01-01", "--end_date", "1996-01-01"])
        .arg("--table_path")
        .arg(dir.path())
        .arg("--result_path")
        .arg(&out)
        .status()
        .unwrap();

    assert!(!status.success());
    assert!(!out.exists());
}
