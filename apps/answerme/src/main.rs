use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use client_core::{InteractionController, QueryResult, UploadedFile};
use tokio::io::{AsyncBufReadExt, BufReader};

mod config;

/// Terminal client for the answerme document QA service: upload one PDF,
/// then ask questions about its content.
#[derive(Parser, Debug)]
struct Args {
    /// PDF document to upload and question.
    #[arg(long)]
    file: PathBuf,
    /// Base URL of the QA service (overrides answerme.toml and environment).
    #[arg(long)]
    server_url: Option<String>,
    /// Ask a single question and exit instead of starting the prompt loop.
    #[arg(long)]
    question: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();
    let settings = config::load_settings(args.server_url.clone());

    let file = read_pdf(&args.file)?;
    let file_name = file.name.clone();
    let controller = InteractionController::new(settings.server_url.clone());

    println!("Uploading {file_name} to {}...", settings.server_url);
    controller.submit_upload(file).await;

    let snapshot = controller.snapshot().await;
    if let Some(error) = snapshot.error {
        bail!("{error}");
    }
    let document_id = snapshot
        .document_id
        .context("upload resolved without a document id")?;
    tracing::info!(document_id = %document_id.0, "document indexed");
    println!("Indexed {file_name} as document {}.", document_id.0);

    if let Some(question) = args.question {
        ask_and_print(&controller, &question).await;
        return Ok(());
    }

    println!("Ask a question about the document (blank line to exit).");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if line.trim().is_empty() {
            break;
        }
        ask_and_print(&controller, &line).await;
    }

    Ok(())
}

async fn ask_and_print(controller: &InteractionController, question: &str) {
    controller.submit_question(question).await;

    let snapshot = controller.snapshot().await;
    if let Some(error) = snapshot.error {
        eprintln!("{error}");
        return;
    }
    if let Some(result) = snapshot.result {
        print_answer(&result);
    }
}

fn print_answer(result: &QueryResult) {
    println!("{}", result.answer);
    if result.sources.is_empty() {
        return;
    }

    println!("Sources:");
    for source in &result.sources {
        println!("  {}", source.preview(160));
    }
}

/// The prompt surface filters to PDFs before the controller ever sees the
/// file; the controller re-checks defensively.
fn read_pdf(path: &Path) -> Result<UploadedFile> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    if extension.as_deref() != Some("pdf") {
        bail!("{} is not a PDF file", path.display());
    }

    let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("document.pdf")
        .to_string();
    Ok(UploadedFile::pdf(name, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_pdf_path_before_reading() {
        let err = read_pdf(Path::new("notes.txt")).expect_err("must reject");
        assert!(err.to_string().contains("not a PDF"));
    }

    #[test]
    fn accepts_uppercase_pdf_extension() {
        // Bails on the missing file, not on the extension.
        let err = read_pdf(Path::new("missing-but-valid.PDF")).expect_err("file absent");
        assert!(err.to_string().contains("failed to read"));
    }
}
