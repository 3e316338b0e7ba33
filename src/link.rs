use crate::error::LinkError;
use crate::source::{DUTY_TABLE, LEAK_TABLE};

const SHEETS_BASE: &str = "https://docs.google.com/spreadsheets/d";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetLinks {
    pub sheet_id: String,
    pub leak_log: String,
    pub duty_log: String,
}

/// Builds CSV export links for both tabs of a shared Google Sheet.
pub fn sheet_links(url: &str) -> Result<SheetLinks, LinkError> {
    let url = url.trim();
    let sheet_id = url
        .split_once("/d/")
        .and_then(|(_, rest)| rest.split(['/', '?', '#']).next())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| LinkError::MissingSheetId(url.to_string()))?;

    Ok(SheetLinks {
        sheet_id: sheet_id.to_string(),
        leak_log: export_url(sheet_id, LEAK_TABLE),
        duty_log: export_url(sheet_id, DUTY_TABLE),
    })
}

fn export_url(sheet_id: &str, tab: &str) -> String {
    format!(
        "{SHEETS_BASE}/{sheet_id}/gviz/tq?tqx=out:csv&sheet={}",
        tab.replace(' ', "%20")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_export_links_for_both_tabs() {
        let links = sheet_links(
            " https://docs.google.com/spreadsheets/d/1AbC-xyz_42/edit#gid=0 ",
        )
        .unwrap();

        assert_eq!(links.sheet_id, "1AbC-xyz_42");
        assert_eq!(
            links.leak_log,
            "https://docs.google.com/spreadsheets/d/1AbC-xyz_42/gviz/tq?tqx=out:csv&sheet=Calibration%20Log"
        );
        assert_eq!(
            links.duty_log,
            "https://docs.google.com/spreadsheets/d/1AbC-xyz_42/gviz/tq?tqx=out:csv&sheet=Duty%20Cycle"
        );
    }

    #[test]
    fn accepts_bare_sheet_path() {
        let links = sheet_links("https://docs.google.com/spreadsheets/d/abc123").unwrap();
        assert_eq!(links.sheet_id, "abc123");
    }

    #[test]
    fn rejects_urls_without_sheet_id() {
        assert!(matches!(
            sheet_links("https://example.com/spreadsheets/"),
            Err(LinkError::MissingSheetId(_))
        ));
        assert!(sheet_links("https://docs.google.com/spreadsheets/d/").is_err());
    }
}
