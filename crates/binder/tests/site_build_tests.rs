use anyhow::Result;
use binder::{Binder, DirSource, Error, PathResolver, Section, SectionOutcome, SiteBuilder, StaticThemeStore};
use std::path::Path;
use std::sync::Arc;

mod mock_server;
use mock_server::fixture_site;

fn copy_tree(from: &Path, to: &Path) -> Result<()> {
    std::fs::create_dir_all(to)?;
    for entry in std::fs::read_dir(from)? {
        let entry = entry?;
        let dest = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_tree(&entry.path(), &dest)?;
        } else {
            std::fs::copy(entry.path(), dest)?;
        }
    }
    Ok(())
}

fn builder(root: &Path) -> SiteBuilder {
    let binder = Binder::new(Arc::new(DirSource::new(root)))
        .with_theme(Arc::new(StaticThemeStore::new(Some("dark".to_string()))));
    SiteBuilder::new(binder, root)
}

#[tokio::test]
async fn test_build_fixture_site() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let root = tmp.path().join("site");
    let out = tmp.path().join("dist");
    copy_tree(&fixture_site(), &root)?;

    let reports = builder(&root).build(&out).await?;
    let pages: Vec<_> = reports.iter().map(|r| r.page.as_str()).collect();
    assert_eq!(
        pages,
        vec![
            "about.html",
            "index.html",
            "news.html",
            "people/members.html",
            "research.html",
            "teaching/index.html"
        ]
    );
    assert!(reports.iter().all(|r| r.failures().count() == 0));
    assert!(reports.iter().all(|r| r.theme_applied));

    // Only pages are written
    assert!(!out.join("css/style.css").exists());
    assert!(!out.join("data/tools.json").exists());

    let index = std::fs::read_to_string(out.join("index.html"))?;
    assert!(index.contains(r#"<body data-layout-mode="dark">"#));
    assert!(!index.contains("placeholder"));
    assert_eq!(index.matches(r#"<a class="tool-link""#).count(), 3);
    assert!(index.contains(r#"<svg viewBox="0 0 24 24">"#));
    assert!(!index.contains("images/tools/gitlab.png"));
    assert!(index.contains(r#"<img src="images/tools/wiki.png" alt="Wiki Logo">"#));
    // Fallback news: 2023 before 2022 before 2021, items in order
    let award = index.find("Best paper award").unwrap_or(usize::MAX);
    let students = index.find("New PhD students").unwrap_or(usize::MAX);
    let founded = index.find("Lab founded").unwrap_or(usize::MAX);
    let grant = index.find("Grant awarded").unwrap_or(usize::MAX);
    assert!(award < students && students < founded && founded < grant && grant < usize::MAX);
    assert!(index.contains(r#"target="_self""#));

    let about = std::fs::read_to_string(out.join("about.html"))?;
    assert!(about.contains("<p>We build data systems.</p>"));
    assert!(reports[0].sections.iter().all(|s| matches!(s.outcome, SectionOutcome::Skipped)));
    Ok(())
}

#[tokio::test]
async fn test_nested_pages_use_parent_data() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let root = tmp.path().join("site");
    let out = tmp.path().join("dist");
    copy_tree(&fixture_site(), &root)?;

    builder(&root).build(&out).await?;

    let members = std::fs::read_to_string(out.join("people/members.html"))?;
    // Faculty and PhD in #allmembers, then each group in its own view
    assert_eq!(members.matches("Prof. Dr. Jane Roe</h4>").count(), 2);
    assert_eq!(members.matches("Alex Doe</h4>").count(), 2);
    assert!(members.contains(r#"<a href="tel:+49 30 1234 5678">"#));
    assert!(members.contains(r#"<p class="member-room mb-2">"#));
    assert_eq!(members.matches("View Profile").count(), 2);
    assert_eq!(members.matches("tool-link").count(), 3);

    let teaching = std::fs::read_to_string(out.join("teaching/index.html"))?;
    assert!(teaching.contains(r#"<i class="mdi mdi-database fs-24 text-success"></i>"#));
    assert!(teaching.contains(r#"<i class="mdi mdi-book fs-24 text-primary"></i>"#));
    assert!(teaching.contains("Big Data Analytics"));
    // No 2022 data: container untouched
    assert!(teaching.contains(r#"<div class="row"><p>Archived courses</p></div>"#));
    Ok(())
}

#[tokio::test]
async fn test_tabbed_news_and_research_ids() -> Result<()> {
    let root = fixture_site();
    let builder = builder(&root);

    let (news, report) = builder.bind_page("news.html").await?;
    assert!(matches!(report.outcome(Section::News), Some(SectionOutcome::Rendered(3))));
    let html = news.as_str();
    assert!(html.contains("Best paper award"));
    assert!(html.contains("Lab founded"));
    assert!(html.contains("Grant awarded"));
    // Tab state is left as authored
    assert!(html.contains(r#"<div class="tab-pane fade show active" id="news2023">"#));

    let (research, _) = builder.bind_page("research.html").await?;
    let html = research.as_str();
    assert!(html.contains(r#"id="theme2""#));
    assert!(html.contains(r#"id="themeHeading2""#));
    assert!(html.contains(r#"alt="Storage &quot;engines&quot;""#));
    assert!(html.contains(r##"data-bs-parent="#topicsAccordion""##));
    assert!(html.contains(r#"id="project0""#));
    Ok(())
}

#[tokio::test]
async fn test_activate_year_at_build() -> Result<()> {
    let root = fixture_site();
    let binder = Binder::new(Arc::new(DirSource::new(&root))).with_active_year(Some("2021".to_string()));
    let builder = SiteBuilder::new(binder, &root);

    let (page, report) = builder.bind_page("news.html").await?;
    assert_eq!(report.activated_year, Some(true));
    let html = page.as_str();
    assert!(html.contains(r#"<button class="nav-link active" data-year="2021" type="button">"#));
    assert!(html.contains(r#"<button class="nav-link" data-year="2023" type="button">"#));
    assert!(html.contains(r#"<div class="tab-pane fade show active" id="news2021">"#));
    assert!(html.contains(r#"<div class="tab-pane fade" id="news2023">"#));
    Ok(())
}

#[tokio::test]
async fn test_explicit_prefix() -> Result<()> {
    let tmp = tempfile::tempdir()?;
    let root = tmp.path().join("site");
    copy_tree(&fixture_site(), &root)?;

    // Every page reads data/ next to itself; people/data does not exist
    let binder = Binder::new(Arc::new(DirSource::new(&root))).with_resolver(PathResolver::explicit(""));
    let builder = SiteBuilder::new(binder, &root);
    let (_, report) = builder.bind_page("people/members.html").await?;
    assert!(matches!(
        report.outcome(Section::Members),
        Some(SectionOutcome::Failed(Error::Request { status: None, .. }))
    ));
    let members = report
        .sections
        .iter()
        .find(|s| s.section == Section::Members)
        .and_then(|s| s.path.as_deref());
    assert_eq!(members, Some("people/data/members.json"));
    Ok(())
}
