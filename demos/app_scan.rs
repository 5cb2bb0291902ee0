//! # Example: app_scan
//!
//! Scans a catalogue of apps with a bounded pool and builds an object usage table.
//!
//! Listing is paginated; every app scan is one job. Some apps refuse the connection,
//! which shows up as a failed outcome without interrupting the batch.
//!
//! ## Flow
//! ```text
//! list_app_ids() ──► submit_all(scan jobs) ──► drain_with(progress) ──► merge ──► table
//!                          capacity = 8
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example app_scan
//! RUST_LOG=jobpool=info cargo run --example app_scan
//! ```

use std::collections::BTreeMap;
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};

use jobpool::{JobError, JobFn, JobRef, LogWriter, Pool, PoolConfig, Subscribe, progress_symbol};
use tracing_subscriber::EnvFilter;

const PAGE_SIZE: usize = 100;
const APP_COUNT: usize = 230;
const CAPACITY: usize = 8;

/// One visualization found on a sheet.
#[derive(Debug, Clone)]
struct ObjectInfo {
    id: String,
    kind: &'static str,
}

/// Objects per `(app, sheet)`.
type SheetContents = BTreeMap<(String, String), Vec<ObjectInfo>>;

struct Page {
    ids: Vec<String>,
    next: Option<usize>,
}

/// Simulated listing endpoint: one page of app ids plus the offset of the next page.
async fn fetch_page(offset: usize) -> Page {
    tokio::time::sleep(Duration::from_millis(15)).await;
    let end = (offset + PAGE_SIZE).min(APP_COUNT);
    Page {
        ids: (offset..end).map(|n| format!("app-{n:04}")).collect(),
        next: (end < APP_COUNT).then_some(end),
    }
}

async fn list_app_ids() -> Vec<String> {
    let mut ids = Vec::new();
    let mut next = Some(0);
    while let Some(offset) = next {
        let page = fetch_page(offset).await;
        ids.extend(page.ids);
        next = page.next;
    }
    ids
}

/// Simulated app session: opens the app and collects the objects of every sheet.
async fn scan_app(app_id: String, seed: usize) -> Result<SheetContents, JobError> {
    tokio::time::sleep(Duration::from_millis(20 + (seed * 37 % 60) as u64)).await;
    if seed % 17 == 5 {
        return Err(JobError::fail(format!("{app_id}: connection refused")));
    }

    const KINDS: [&str; 4] = ["barchart", "table", "kpi", "filterpane"];
    let mut contents = SheetContents::new();
    for sheet in 0..(1 + seed % 3) {
        let objects = (0..(2 + (seed + sheet) % 4))
            .map(|o| ObjectInfo {
                id: format!("{app_id}/s{sheet}/o{o}"),
                kind: KINDS[(seed + o) % KINDS.len()],
            })
            .collect();
        contents.insert((app_id.clone(), format!("sheet-{sheet}")), objects);
    }
    Ok(contents)
}

fn print_table(contents: &SheetContents) {
    println!("{:<10} {:<9} {:>7}  kinds", "app", "sheet", "objects");
    for ((app, sheet), objects) in contents.iter().take(12) {
        let mut kinds: Vec<&str> = objects.iter().map(|o| o.kind).collect();
        kinds.sort_unstable();
        kinds.dedup();
        println!(
            "{:<10} {:<9} {:>7}  {}",
            app,
            sheet,
            objects.len(),
            kinds.join(",")
        );
    }
    if contents.len() > 12 {
        println!("... {} more sheets", contents.len() - 12);
    }
    let objects: usize = contents.values().map(Vec::len).sum();
    println!("{} sheets, {objects} objects", contents.len());
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let started = Instant::now();
    let app_ids = list_app_ids().await;
    println!("Scanning {} apps.", app_ids.len());

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let mut pool = Pool::<SheetContents>::builder(PoolConfig::with_capacity(CAPACITY))
        .with_subscribers(subs)
        .build()?;

    let jobs: Vec<JobRef<SheetContents>> = app_ids
        .into_iter()
        .enumerate()
        .map(|(seed, app_id)| {
            JobFn::boxed(format!("scan-{app_id}"), move || scan_app(app_id, seed))
        })
        .collect();
    pool.submit_all(jobs);

    let mut stdout = std::io::stdout();
    let report = pool
        .drain_with(|i, outcome| {
            if outcome.is_err() {
                print!("e");
            }
            print!("{}", progress_symbol(i));
            let _ = stdout.flush();
        })
        .await?;
    println!();

    for failed in &report.failed {
        if let Some(err) = failed.error() {
            tracing::warn!(job = %failed.name, error = %err, "scan failed");
        }
    }
    let summary = report.summary();

    let mut merged = SheetContents::new();
    for contents in report.into_values() {
        merged.extend(contents);
    }

    pool.finish().await;

    print_table(&merged);
    println!("{summary}");
    println!("Total time: {:.2?}", started.elapsed());
    Ok(())
}
