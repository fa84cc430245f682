use anyhow::{Context, Result};
use colored::Colorize;
use tabled::{builder::Builder, settings::Style};
use tracing::info;

use crate::{
    cli_types::{FilterArgs, ListArgs, OutputFormat, SuggestArgs},
    config::ServerConfig,
    query::ProductFilter,
    storage::memory::Catalog,
    types::{CatalogOverview, Facet, ProductRecord},
};

pub struct CliApp {
    config: ServerConfig,
    catalog: Option<Catalog>,
    verbose: bool,
}

impl CliApp {
    pub fn new(config: ServerConfig, verbose: bool) -> Self {
        info!("Initializing catalog CLI");
        Self {
            config,
            catalog: None,
            verbose,
        }
    }

    /// Use an already-built catalog instead of reading `csv_path`.
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn load(&mut self) -> Result<()> {
        let overview = self.catalog()?.overview();
        println!("{}", self.render_load_report(&overview));
        Ok(())
    }

    pub fn list(&mut self, args: ListArgs) -> Result<()> {
        let catalog = self.catalog()?;
        let products: Vec<&ProductRecord> = catalog
            .list()
            .iter()
            .take(args.limit.unwrap_or(usize::MAX))
            .collect();

        let output = render_products(catalog.columns(), &products, args.format)?;
        println!("{}", output);
        Ok(())
    }

    pub fn filter(&mut self, args: FilterArgs) -> Result<()> {
        let verbose = self.verbose;
        let catalog = self.catalog()?;
        let filter = ProductFilter::from_params(args.predicates);
        let result = catalog.filter(&filter);

        if verbose {
            eprintln!(
                "{} {} of {} products matched in {} ms",
                "→".cyan(),
                result.total_matches,
                catalog.len(),
                result.query_duration_ms
            );
        }

        let products: Vec<&ProductRecord> = result
            .items
            .into_iter()
            .take(args.limit.unwrap_or(usize::MAX))
            .collect();

        let output = render_products(catalog.columns(), &products, args.format)?;
        println!("{}", output);
        Ok(())
    }

    pub fn suggest(&mut self, args: SuggestArgs) -> Result<()> {
        let suggestions = self.catalog()?.suggest(Some(&args.query));
        if suggestions.is_empty() {
            eprintln!("{}", "No suggestions".yellow());
        }
        for name in suggestions {
            println!("{}", name);
        }
        Ok(())
    }

    pub fn facets(&mut self) -> Result<()> {
        let facets = self.catalog()?.facets();
        println!("{}", render_facets(&facets));
        Ok(())
    }

    pub fn show_config(&self) -> Result<()> {
        let text = self
            .config
            .to_toml()
            .context("Failed to serialize configuration")?;
        println!("{}", text);
        Ok(())
    }

    fn catalog(&mut self) -> Result<&Catalog> {
        if self.catalog.is_none() {
            let path = self.config.csv_path.clone();
            let catalog = Catalog::load(&path)
                .with_context(|| format!("Failed to load product table: {}", path.display()))?;
            self.catalog = Some(catalog);
        }

        self.catalog
            .as_ref()
            .context("Product catalog unavailable")
    }

    fn render_load_report(&self, overview: &CatalogOverview) -> String {
        let report = &overview.load;
        let mut lines = vec![
            format!("{}", "Product table loaded".green().bold()),
            format!("  Source:    {}", self.config.csv_path.display()),
            format!("  Rows:      {}", report.rows_seen),
            format!("  Accepted:  {}", report.accepted.to_string().green()),
            format!("  Rejected:  {}", report.rejected.to_string().yellow()),
            format!("  Malformed: {}", report.malformed.to_string().red()),
        ];
        if self.verbose {
            lines.push(format!("  Size:      {} bytes", report.source_bytes));
            lines.push(format!("  Memory:    ~{} bytes", overview.memory_usage_bytes));
            lines.push(format!("  Columns:   {}", overview.columns.join(", ")));
        }
        lines.join("\n")
    }
}

/// Table or JSON rendering of products. Table columns follow the header order.
pub fn render_products(
    columns: &[String],
    products: &[&ProductRecord],
    format: OutputFormat,
) -> Result<String> {
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(products).context("Failed to serialize products to JSON")
        }
        OutputFormat::Table => {
            if products.is_empty() {
                return Ok("No products".to_string());
            }

            let mut builder = Builder::default();
            builder.push_record(columns.iter().cloned());
            for product in products {
                builder.push_record(
                    columns
                        .iter()
                        .map(|c| product.get(c).unwrap_or("-").to_string()),
                );
            }

            let mut table = builder.build();
            table.with(Style::rounded());
            Ok(table.to_string())
        }
    }
}

pub fn render_facets(facets: &[Facet]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Field".to_string(), "Values".to_string()]);
    for facet in facets {
        builder.push_record([facet.field.clone(), facet.values.join(", ")]);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli_types::OutputFormat;
    use crate::types::PRODUCT_NAME;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_config(dir: &TempDir) -> ServerConfig {
        let path = dir.path().join("EOCR설정표.csv");
        fs::write(
            &path,
            "제품,제품군,누설(지락)\nEOCR-SS,전자식,X\nEOCR-3DE,전자식,O\nEOCR-DS1,디지털,\n",
        )
        .unwrap();

        ServerConfig {
            csv_path: path,
            ..ServerConfig::default()
        }
    }

    #[test]
    fn test_commands_run_against_csv() {
        let temp_dir = TempDir::new().unwrap();
        let mut app = CliApp::new(create_test_config(&temp_dir), true);

        assert!(app.load().is_ok());
        assert!(app.list(ListArgs { limit: Some(2), format: OutputFormat::Table }).is_ok());
        assert!(app
            .filter(FilterArgs {
                predicates: vec![("누설지락".to_string(), "O".to_string())],
                limit: None,
                format: OutputFormat::Json,
            })
            .is_ok());
        assert!(app.suggest(SuggestArgs { query: "eocr".to_string() }).is_ok());
        assert!(app.facets().is_ok());
        assert!(app.show_config().is_ok());
    }

    #[test]
    fn test_missing_csv_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let config = ServerConfig {
            csv_path: temp_dir.path().join("missing.csv"),
            ..ServerConfig::default()
        };
        let mut app = CliApp::new(config, false);

        let err = app.load().unwrap_err();
        assert!(err.to_string().contains("Failed to load product table"));
    }

    #[test]
    fn test_with_catalog_skips_disk() {
        let catalog = Catalog::from_records(vec![
            ProductRecord::new().with_field(PRODUCT_NAME, Some("EOCR-SS")),
        ]);
        let config = ServerConfig {
            csv_path: "does/not/exist.csv".into(),
            ..ServerConfig::default()
        };
        let mut app = CliApp::new(config, false).with_catalog(catalog);
        assert!(app.load().is_ok());
    }

    #[test]
    fn test_render_products_table_and_json() {
        let columns = vec![PRODUCT_NAME.to_string(), "전력".to_string()];
        let a = ProductRecord::new()
            .with_field(PRODUCT_NAME, Some("EOCR-SS"))
            .with_field("전력", None);
        let products = vec![&a];

        let table = render_products(&columns, &products, OutputFormat::Table).unwrap();
        assert!(table.contains("EOCR-SS"));
        assert!(table.contains("전력"));

        let json = render_products(&columns, &products, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["제품"], "EOCR-SS");
        assert!(value[0]["전력"].is_null());

        let empty = render_products(&columns, &[], OutputFormat::Table).unwrap();
        assert_eq!(empty, "No products");
    }

    #[test]
    fn test_render_facets() {
        let facets = vec![Facet {
            field: "제품군".to_string(),
            values: vec!["전자식".to_string(), "디지털".to_string()],
        }];
        let text = render_facets(&facets);
        assert!(text.contains("전자식, 디지털"));
    }
}
