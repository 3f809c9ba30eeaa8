use crate::annotations::AnnotationBook;
use crate::calendar::MonthRef;
use crate::config::StripConfig;
use crate::layout::{self, paged_file_name, sheet_file_name, Format, STRIP_FILE_STEM};
use crate::raster;
use crate::render::PdfSurface;
use crate::style::StyleConfig;
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};
use time::Month;

/// Writes the yearly PDFs selected by `format` into `dir` and returns their
/// paths
pub(crate) fn year_pdfs(
    year: i32,
    format: Format,
    dir: &Path,
    book: &mut AnnotationBook,
    style: &StyleConfig,
) -> anyhow::Result<Vec<PathBuf>> {
    let january = MonthRef::new(year, Month::January)
        .with_context(|| format!("year {year} is out of range"))?;
    let mut written = Vec::new();
    if format.paged() {
        let mut surface = PdfSurface::new();
        layout::paged(&mut surface, january, book, style)
            .context("failed to lay out paged calendar")?;
        written.push(write_pdf(surface, &dir.join(paged_file_name(year)))?);
    }
    if format.sheet() {
        let mut surface = PdfSurface::new();
        layout::sheet(&mut surface, january, book, style)
            .context("failed to lay out calendar sheet")?;
        written.push(write_pdf(surface, &dir.join(sheet_file_name(year)))?);
    }
    Ok(written)
}

/// Writes the widget strip starting at `start` into `dir`, plus a PNG
/// rendering of it if configured, and returns the paths written
pub(crate) fn strip_files(
    start: MonthRef,
    config: &StripConfig,
    dir: &Path,
    book: &mut AnnotationBook,
    style: &StyleConfig,
) -> anyhow::Result<Vec<PathBuf>> {
    let mut surface = PdfSurface::new();
    layout::strip(&mut surface, start, &config.geometry(), book, style)
        .context("failed to lay out calendar strip")?;
    let pdf = write_pdf(surface, &dir.join(STRIP_FILE_STEM).with_extension("pdf"))?;
    let mut written = vec![pdf.clone()];
    if config.png {
        let png = pdf.with_extension("png");
        raster::rasterize(&pdf, &png, config.dpi)
            .with_context(|| format!("failed to rasterize {}", pdf.display()))?;
        if config.transparent {
            raster::make_transparent(&png, config.threshold).with_context(|| {
                format!("failed to make background of {} transparent", png.display())
            })?;
        }
        log::info!("Wrote {}", png.display());
        written.push(png);
    }
    Ok(written)
}

fn write_pdf(surface: PdfSurface, path: &Path) -> anyhow::Result<PathBuf> {
    let pages = surface.page_count();
    fs::write(path, surface.finish())
        .with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("Wrote {} ({pages} pages)", path.display());
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotations::AnnotationSettings;
    use std::collections::BTreeMap;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("calprint-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_year_pdfs() {
        let dir = scratch_dir("year");
        let mut book = AnnotationBook::new(AnnotationSettings::default());
        let written = year_pdfs(
            2026,
            Format::Both,
            &dir,
            &mut book,
            &StyleConfig::default(),
        )
        .unwrap();
        assert_eq!(
            written,
            [
                dir.join("calendar_2026_office.pdf"),
                dir.join("calendar_2026_full.pdf")
            ]
        );
        for path in &written {
            let bytes = fs::read(path).unwrap();
            assert!(bytes.starts_with(b"%PDF-"));
        }
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_year_pdfs_are_reproducible() {
        let mut style = StyleConfig::widget();
        style.features.birthdays = true;
        let settings = AnnotationSettings {
            birthdays: BTreeMap::from([(3, "21".to_owned()), (12, "1, 25".to_owned())]),
            ..AnnotationSettings::default()
        };
        let render = |name: &str| {
            let dir = scratch_dir(name);
            let mut book = AnnotationBook::new(settings.clone());
            let bytes = year_pdfs(2026, Format::Both, &dir, &mut book, &style)
                .unwrap()
                .iter()
                .map(|path| fs::read(path).unwrap())
                .collect::<Vec<_>>();
            fs::remove_dir_all(&dir).unwrap();
            bytes
        };
        let first = render("repro-a");
        assert_eq!(first.len(), 2);
        assert_eq!(first, render("repro-b"));
    }

    #[test]
    fn test_sheet_only() {
        let dir = scratch_dir("sheet");
        let mut book = AnnotationBook::new(AnnotationSettings::default());
        let written = year_pdfs(
            2027,
            Format::Sheet,
            &dir,
            &mut book,
            &StyleConfig::default(),
        )
        .unwrap();
        assert_eq!(written, [dir.join("calendar_2027_full.pdf")]);
        assert!(!dir.join("calendar_2027_office.pdf").exists());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_strip_pdf() {
        let dir = scratch_dir("strip");
        let mut book = AnnotationBook::new(AnnotationSettings::default());
        let written = strip_files(
            MonthRef::new(2026, Month::October).unwrap(),
            &StripConfig::default(),
            &dir,
            &mut book,
            &StyleConfig::default(),
        )
        .unwrap();
        assert_eq!(written, [dir.join("calendar_strip.pdf")]);
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_output_dir() {
        let dir = std::env::temp_dir().join("calprint-does-not-exist/nested");
        let mut book = AnnotationBook::new(AnnotationSettings::default());
        let r = year_pdfs(
            2026,
            Format::Paged,
            &dir,
            &mut book,
            &StyleConfig::default(),
        );
        assert!(r.is_err());
    }
}
