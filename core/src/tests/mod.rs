
mod pipeline_tiers;
