//! Resource CRUD commands.

use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::Validate;

use hrms_cache::QueryParams;
use hrms_client::resources::{self, Resource};
use hrms_client::{HrmsClient, http::message_of};
use hrms_core::error::AppError;
use hrms_entity::EntityId;
use hrms_entity::client::NewClient;
use hrms_entity::department::NewDepartment;
use hrms_entity::employee::NewEmployee;
use hrms_entity::job_role::NewJobRole;
use hrms_entity::salary::NewSalary;
use hrms_entity::staff::NewStaffMember;

use crate::output::{self, OutputFormat};

/// Arguments for `list`
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Resource key, e.g. `employees`
    pub resource: String,
    /// Query parameter as `key=value` (repeatable)
    #[arg(short = 'q', long = "param")]
    pub params: Vec<String>,
}

/// Record payload, inline or from a file
#[derive(Debug, Args)]
pub struct Payload {
    /// JSON payload
    #[arg(short, long, conflicts_with = "file")]
    pub data: Option<String>,
    /// File containing the JSON payload
    #[arg(long)]
    pub file: Option<PathBuf>,
}

/// Arguments for `create`
#[derive(Debug, Args)]
pub struct CreateArgs {
    /// Resource key
    pub resource: String,
    /// Record payload
    #[command(flatten)]
    pub payload: Payload,
}

/// Arguments for `update`
#[derive(Debug, Args)]
pub struct UpdateArgs {
    /// Resource key
    pub resource: String,
    /// Record id
    pub id: String,
    /// Record payload
    #[command(flatten)]
    pub payload: Payload,
}

/// Arguments for `delete`
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Resource key
    pub resource: String,
    /// Record id
    pub id: String,
    /// Skip confirmation
    #[arg(long)]
    pub yes: bool,
}

fn unknown(resource: &str) -> AppError {
    let known: Vec<&str> = resources::ALL.iter().map(|s| s.key).collect();
    AppError::validation(format!(
        "Unknown resource '{resource}' (expected one of: {})",
        known.join(", ")
    ))
}

fn parse_params(raw: &[String]) -> Result<QueryParams, AppError> {
    raw.iter()
        .map(|p| {
            p.split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                .ok_or_else(|| AppError::validation(format!("Expected key=value, got '{p}'")))
        })
        .collect()
}

impl Payload {
    fn read(&self) -> Result<Value, AppError> {
        let raw = match (&self.data, &self.file) {
            (Some(data), _) => data.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)?,
            (None, None) => {
                return Err(AppError::validation("Provide a payload with --data or --file"));
            }
        };
        serde_json::from_str(&raw)
            .map_err(|e| AppError::validation(format!("Payload is not valid JSON: {e}")))
    }
}

async fn list_with<T>(
    hook: &Resource<T>,
    params: &QueryParams,
    format: OutputFormat,
) -> Result<(), AppError>
where
    T: DeserializeOwned + Serialize + Clone + Send + Sync + 'static,
{
    let records = hook.read(params).await?;
    output::print_records(&records, format);
    Ok(())
}

fn draft<D: DeserializeOwned>(body: Value) -> Result<D, AppError> {
    serde_json::from_value(body).map_err(|e| AppError::validation(format!("Invalid payload: {e}")))
}

async fn create_with<D, T>(hook: &Resource<T>, body: Value) -> Result<Value, AppError>
where
    D: DeserializeOwned + Serialize + Validate + Sync,
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    hook.create(&draft::<D>(body)?).await
}

async fn update_with<D, T>(hook: &Resource<T>, id: &EntityId, body: Value) -> Result<Value, AppError>
where
    D: DeserializeOwned + Serialize + Validate + Sync,
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    hook.update(id, &draft::<D>(body)?).await
}

/// List records.
pub async fn list(client: &HrmsClient, args: &ListArgs, format: OutputFormat) -> Result<(), AppError> {
    let params = parse_params(&args.params)?;
    match args.resource.as_str() {
        "clients" => list_with(&client.clients, &params, format).await,
        "employees" => list_with(&client.employees, &params, format).await,
        "departments" => list_with(&client.departments, &params, format).await,
        "job-roles" => list_with(&client.job_roles, &params, format).await,
        "salaries" => list_with(&client.salaries, &params, format).await,
        "onboarding-managers" => list_with(&client.onboarding_managers, &params, format).await,
        "recruiters" => list_with(&client.recruiters, &params, format).await,
        other => Err(unknown(other)),
    }
}

/// Create a record.
pub async fn create(
    client: &HrmsClient,
    args: &CreateArgs,
    format: OutputFormat,
) -> Result<(), AppError> {
    let body = args.payload.read()?;
    let created = match args.resource.as_str() {
        "clients" => create_with::<NewClient, _>(&client.clients, body).await?,
        "employees" => create_with::<NewEmployee, _>(&client.employees, body).await?,
        "departments" => create_with::<NewDepartment, _>(&client.departments, body).await?,
        "job-roles" => create_with::<NewJobRole, _>(&client.job_roles, body).await?,
        "salaries" => create_with::<NewSalary, _>(&client.salaries, body).await?,
        "onboarding-managers" => {
            create_with::<NewStaffMember, _>(&client.onboarding_managers, body).await?
        }
        "recruiters" => create_with::<NewStaffMember, _>(&client.recruiters, body).await?,
        other => return Err(unknown(other)),
    };
    report(&args.resource, "created", &created, format);
    Ok(())
}

/// Update a record.
pub async fn update(
    client: &HrmsClient,
    args: &UpdateArgs,
    format: OutputFormat,
) -> Result<(), AppError> {
    let body = args.payload.read()?;
    let id = EntityId::new(args.id.clone());
    let updated = match args.resource.as_str() {
        "clients" => update_with::<NewClient, _>(&client.clients, &id, body).await?,
        "employees" => update_with::<NewEmployee, _>(&client.employees, &id, body).await?,
        "departments" => update_with::<NewDepartment, _>(&client.departments, &id, body).await?,
        "job-roles" => update_with::<NewJobRole, _>(&client.job_roles, &id, body).await?,
        "salaries" => update_with::<NewSalary, _>(&client.salaries, &id, body).await?,
        "onboarding-managers" => {
            update_with::<NewStaffMember, _>(&client.onboarding_managers, &id, body).await?
        }
        "recruiters" => update_with::<NewStaffMember, _>(&client.recruiters, &id, body).await?,
        other => return Err(unknown(other)),
    };
    report(&args.resource, "updated", &updated, format);
    Ok(())
}

/// Delete a record, after confirmation.
pub async fn delete(client: &HrmsClient, args: &DeleteArgs) -> Result<(), AppError> {
    if resources::spec_for(&args.resource).is_none() {
        return Err(unknown(&args.resource));
    }
    if !args.yes {
        let confirm = dialoguer::Confirm::new()
            .with_prompt(format!("Delete {} {}?", args.resource, args.id))
            .default(false)
            .interact()
            .map_err(super::input_error)?;
        if !confirm {
            output::print_warning("Aborted");
            return Ok(());
        }
    }

    let id = EntityId::new(args.id.clone());
    match args.resource.as_str() {
        "clients" => client.clients.delete(&id).await?,
        "employees" => client.employees.delete(&id).await?,
        "departments" => client.departments.delete(&id).await?,
        "job-roles" => client.job_roles.delete(&id).await?,
        "salaries" => client.salaries.delete(&id).await?,
        "onboarding-managers" => client.onboarding_managers.delete(&id).await?,
        "recruiters" => client.recruiters.delete(&id).await?,
        other => return Err(unknown(other)),
    };
    output::print_success(&format!("Deleted {} {}", args.resource, args.id));
    Ok(())
}

fn report(resource: &str, verb: &str, body: &Value, format: OutputFormat) {
    if format == OutputFormat::Json {
        output::print_item(body, format);
        return;
    }
    match message_of(body) {
        Some(message) => output::print_success(&message),
        None => output::print_success(&format!("{resource} record {verb}")),
    }
}
