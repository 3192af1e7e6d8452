use crate::backup::PULL;
use crate::commands::{open_store, Out};
use crate::model::{Month, Period};
use crate::remote::{MonthRecord, Remote};
use crate::{Config, Result};
use anyhow::Context;
use tracing::{debug, info};

/// Uploads `month`, or every month when `month` is `None`, replacing what the remote holds.
pub async fn push<R>(
    config: Config,
    remote: &mut R,
    month: Option<Month>,
) -> Result<Out<Vec<MonthRecord>>>
where
    R: Remote + ?Sized,
{
    let year = config.year();
    let (_, store) = open_store(&config).await;
    let months = match month {
        Some(month) => vec![month],
        None => Month::ALL.to_vec(),
    };

    let mut saved = Vec::with_capacity(months.len());
    for month in months {
        let rows = store.ledger().period(month).rows();
        let record = remote
            .save_month(year, month, rows)
            .await
            .with_context(|| format!("Unable to push {month} {year}"))?;
        debug!("Pushed {month} {year} with {} rows", rows.len());
        saved.push(record);
    }

    Ok(Out::new(
        format!("Pushed {} months of {year} to the remote", saved.len()),
        saved,
    ))
}

/// Downloads `month`, or every month the remote holds when `month` is `None`, and replaces the
/// local rows of those months. Months the remote does not have are left alone.
///
/// The current ledger is backed up before anything is replaced. When the downloaded rows are
/// numbered out of sequence nothing is replaced.
pub async fn pull<R>(
    config: Config,
    remote: &mut R,
    month: Option<Month>,
) -> Result<Out<Vec<Month>>>
where
    R: Remote + ?Sized,
{
    let year = config.year();
    let records: Vec<MonthRecord> = match month {
        Some(month) => remote
            .fetch_month(year, month)
            .await
            .with_context(|| format!("Unable to pull {month} {year}"))?
            .into_iter()
            .collect(),
        None => remote
            .fetch_year(year)
            .await
            .with_context(|| format!("Unable to pull {year}"))?,
    };
    let records: Vec<MonthRecord> = records.into_iter().filter(|r| r.year == year).collect();
    if records.is_empty() {
        return Ok(Out::new(
            format!("The remote has nothing for {year}, nothing changed"),
            Vec::new(),
        ));
    }

    let (ledger_file, mut store) = open_store(&config).await;
    let backup_path = config.backup().save_json(PULL, store.ledger()).await?;
    debug!("Saved backup to {}", backup_path.display());

    let mut ledger = store.snapshot();
    let mut pulled = Vec::with_capacity(records.len());
    for record in records {
        info!("Pulled {} {year} with {} rows", record.month, record.rows.len());
        pulled.push(record.month);
        ledger.set_period(record.month, Period::from(record.rows));
    }
    pulled.sort();
    pulled.dedup();

    store
        .restore(ledger)
        .context("The remote rows are not numbered in sequence")?;
    ledger_file.save(store.ledger()).await?;

    Ok(Out::new(
        format!("Pulled {} months of {year} from the remote", pulled.len()),
        pulled,
    ))
}

/// Deletes the remote record of `month`.
pub async fn delete_remote<R>(config: Config, remote: &mut R, month: Month) -> Result<Out<bool>>
where
    R: Remote + ?Sized,
{
    let year = config.year();
    let deleted = remote
        .delete_month(year, month)
        .await
        .with_context(|| format!("Unable to delete {month} {year} from the remote"))?;
    let message = if deleted {
        format!("Deleted {month} {year} from the remote")
    } else {
        format!("The remote has no {month} {year}, nothing deleted")
    };
    Ok(Out::new(message, deleted))
}
