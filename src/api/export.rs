use rocket::{
    http::{ContentType, Header},
    Responder, Route, State,
};

use crate::error::Result;
use crate::service::ExportService;
use crate::Config;

pub fn routes() -> Vec<Route> {
    routes![export_tally, export_flat]
}

/// An xlsx file offered as a download.
#[derive(Responder)]
struct Spreadsheet {
    bytes: Vec<u8>,
    content_type: ContentType,
    disposition: Header<'static>,
}

impl Spreadsheet {
    fn new(bytes: Vec<u8>, filename: &str) -> Self {
        Self {
            bytes,
            content_type: ContentType::new(
                "application",
                "vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ),
            disposition: Header::new(
                "Content-Disposition",
                format!("attachment; filename=\"{filename}\""),
            ),
        }
    }
}

#[get("/export.xlsx")]
async fn export_tally(service: ExportService<'_>, config: &State<Config>) -> Result<Spreadsheet> {
    let bytes = service.tally_workbook().await?;
    Ok(Spreadsheet::new(bytes, config.export_filename()))
}

#[get("/export_flat.xlsx")]
async fn export_flat(service: ExportService<'_>, config: &State<Config>) -> Result<Spreadsheet> {
    let bytes = service.flat_workbook().await?;
    Ok(Spreadsheet::new(bytes, config.export_flat_filename()))
}
