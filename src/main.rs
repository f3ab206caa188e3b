use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;

use tw_loan_calc::{
    format_currency, CalculationResult, Calculator, CalculatorForm, Catalog, ConsultationRequest,
    QuickQuote, RepaymentMethod, ResultView,
};

#[derive(Parser)]
#[command(name = "loan-calc", version, about = "Policy loan repayment calculator")]
struct Cli {
    /// JSON product catalog to use instead of the builtin one
    #[arg(long, env = "LOAN_CATALOG", global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List loan products
    Products {
        #[arg(long)]
        json: bool,
    },

    /// Calculate repayments; amount and term are clamped to the product caps
    Calculate {
        #[arg(short, long)]
        product: String,

        /// Principal in units of 10,000
        #[arg(short, long)]
        amount: String,

        /// Term in years
        #[arg(short, long)]
        term: String,

        /// Annual rate in percent (defaults to the product rate)
        #[arg(short, long)]
        rate: Option<String>,

        #[arg(short, long, value_enum, default_value_t = Method::EqualInstallment)]
        method: Method,

        /// Print the per-period schedule
        #[arg(long)]
        schedule: bool,

        #[arg(long)]
        json: bool,
    },

    /// Quick estimate from a product and amount only
    Quote {
        #[arg(short, long)]
        product: String,

        #[arg(short, long)]
        amount: String,

        #[arg(long)]
        json: bool,
    },

    /// Validate a consultation request
    Consult {
        #[arg(long)]
        name: String,

        #[arg(long)]
        phone: String,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        loan_type: String,

        #[arg(long)]
        message: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Method {
    EqualInstallment,
    EqualPrincipal,
}

impl From<Method> for RepaymentMethod {
    fn from(method: Method) -> Self {
        match method {
            Method::EqualInstallment => RepaymentMethod::EqualInstallment,
            Method::EqualPrincipal => RepaymentMethod::EqualPrincipal,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let catalog = match &cli.catalog {
        Some(path) => Catalog::from_path(path)
            .with_context(|| format!("loading catalog {}", path.display()))?,
        None => Catalog::builtin(),
    };
    let calculator = Calculator::new(catalog.clone());

    match cli.command {
        Commands::Products { json } => list_products(&catalog, json),
        Commands::Calculate { product, amount, term, rate, method, schedule, json } => {
            let mut form = CalculatorForm::new(&catalog);
            form.select_product(&catalog, &product)?;
            form.set_amount_text(&amount);
            form.set_term_text(&term);
            if let Some(rate) = rate {
                form.set_rate_text(&rate);
            }
            form.set_method(method.into());

            info!(
                "Calculating {} for {} units over {} years",
                form.product().code,
                form.amount_units(),
                form.term_years()
            );
            let result = form.calculate(&calculator)?;
            print_result(&result, schedule, json)
        }
        Commands::Quote { product, amount, json } => {
            let quote = QuickQuote::prepare(&catalog, &product, &amount)?;
            if quote.amount_adjusted {
                eprintln!(
                    "Maximum for this loan type is {} units; amount adjusted",
                    quote.product.max_principal_units
                );
            }
            let form = quote.into_form(&catalog)?;
            let result = form.calculate(&calculator)?;
            print_result(&result, false, json)
        }
        Commands::Consult { name, phone, email, loan_type, message } => {
            let request = ConsultationRequest { name, phone, email, loan_type, message };
            request.validate()?;
            println!("Thank you! We will contact you at {} shortly.", request.normalized_phone());
            Ok(())
        }
    }
}

fn list_products(catalog: &Catalog, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(catalog)?);
        return Ok(());
    }

    println!("{:<16} {:>8} {:>10} {:>6}  NAME", "CODE", "RATE%", "MAX(萬)", "YEARS");
    for product in catalog.products() {
        println!(
            "{:<16} {:>8} {:>10} {:>6}  {}",
            product.code,
            product.annual_rate_percent,
            product.max_principal_units,
            product.max_term_years,
            product.display_name
        );
    }
    Ok(())
}

fn print_result(result: &CalculationResult, schedule: bool, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    println!("{}", ResultView::from(result));
    if schedule {
        println!();
        println!(
            "{:>6} {:>14} {:>14} {:>14} {:>16}",
            "PERIOD", "PAYMENT", "PRINCIPAL", "INTEREST", "BALANCE"
        );
        for period in &result.schedule {
            println!(
                "{:>6} {:>14} {:>14} {:>14} {:>16}",
                period.period,
                format_currency(period.payment),
                format_currency(period.principal_portion),
                format_currency(period.interest_portion),
                format_currency(period.closing_balance)
            );
        }
    }
    Ok(())
}
