mod pipeline_api;
mod store_scenarios;
