//! Shared fixtures for integration tests: in-memory store, scripted advisor,
//! and in-memory workbook builder.
#![allow(dead_code)]

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use boq_estimator::models::{PricedItem, RateRecord};
use boq_estimator::service::Suggestion;
use boq_estimator::{BoqError, BoqStore, RateAdvisor, Result};
use rust_xlsxwriter::Workbook;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::time::Instant;

pub fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).unwrap()
}

pub fn sample_catalog() -> Vec<RateRecord> {
    vec![
        RateRecord::new("Brickwork", "m²", dec("45.50"), "brick wall masonry"),
        RateRecord::new("Plastering", "m²", dec("12.00"), "plaster,render"),
        RateRecord::new("Excavation", "m³", dec("8.25"), "excavate earth trench"),
    ]
}

/// In-memory `BoqStore`; `fail_next_replace` simulates an insert failure.
#[derive(Default)]
pub struct MemoryStore {
    pub catalog: Vec<RateRecord>,
    pub items: Mutex<HashMap<i64, Vec<PricedItem>>>,
    pub fail_replace: AtomicBool,
}

impl MemoryStore {
    pub fn with_catalog(catalog: Vec<RateRecord>) -> Self {
        Self {
            catalog,
            ..Default::default()
        }
    }

    pub fn fail_replace(&self, fail: bool) {
        self.fail_replace.store(fail, Ordering::SeqCst);
    }

    pub fn stored(&self, project_id: i64) -> Option<Vec<PricedItem>> {
        self.items.lock().unwrap().get(&project_id).cloned()
    }
}

#[async_trait]
impl BoqStore for MemoryStore {
    async fn load_catalog(&self) -> Result<Vec<RateRecord>> {
        Ok(self.catalog.clone())
    }

    async fn replace_items(&self, project_id: i64, items: &[PricedItem]) -> Result<()> {
        if self.fail_replace.load(Ordering::SeqCst) {
            return Err(BoqError::Storage("insert into boq_items failed".to_string()));
        }
        self.items.lock().unwrap().insert(project_id, items.to_vec());
        Ok(())
    }
}

/// Advisor returning scripted replies by description; unknown descriptions fail.
#[derive(Default)]
pub struct ScriptedAdvisor {
    pub replies: HashMap<String, Suggestion>,
    pub calls: Mutex<Vec<(String, Instant)>>,
}

impl ScriptedAdvisor {
    pub fn new(replies: &[(&str, Suggestion)]) -> Self {
        Self {
            replies: replies
                .iter()
                .map(|(d, s)| (d.to_string(), s.clone()))
                .collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl RateAdvisor for ScriptedAdvisor {
    async fn suggest(&self, description: &str, _unit: &str, api_key: Option<&str>) -> Suggestion {
        if api_key.is_none() {
            return Suggestion::Unavailable;
        }
        self.calls
            .lock()
            .unwrap()
            .push((description.to_string(), Instant::now()));
        self.replies
            .get(description)
            .cloned()
            .unwrap_or_else(|| Suggestion::Failed("no scripted reply".to_string()))
    }
}

/// Cell value for `build_workbook`.
pub enum Cell<'a> {
    Text(&'a str),
    Number(f64),
    Blank,
}

/// Builds an xlsx with the standard header and the given data rows.
pub fn build_workbook(rows: &[[Cell<'_>; 4]]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, title) in ["Item No", "Description", "Quantity", "Unit"].iter().enumerate() {
        sheet.write_string(0, col as u16, *title).unwrap();
    }

    for (r, row) in rows.iter().enumerate() {
        let r = (r + 1) as u32;
        for (c, cell) in row.iter().enumerate() {
            match cell {
                Cell::Text(t) => {
                    sheet.write_string(r, c as u16, *t).unwrap();
                }
                Cell::Number(n) => {
                    sheet.write_number(r, c as u16, *n).unwrap();
                }
                Cell::Blank => {}
            }
        }
    }

    workbook.save_to_buffer().unwrap()
}
