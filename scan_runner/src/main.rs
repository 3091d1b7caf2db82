use std::collections::HashMap;

use clap::Parser;
use kdam::tqdm;
use log::{error, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use view_scan::diagnostics::{BuildReport, ScanReport};
use view_scan::structure::{Protein, Structure};
use view_scan::criteria::MatchCriteria;
use view_scan::{Error, PolicyConfig, QuerySet, Result, StandardPolicy, StructureIndex};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {

    //Which task to carry out: scan, self_scan or write_config
    #[arg(short, long)]
    task: String,

    //Policy YAML file, required by scan and self_scan; write_config gives a template to edit
    #[arg(short, long)]
    config: Option<String>,

    //Compact match criteria overriding the config's, e.g. dist_co=12,dirn_co=0,index_dist_co=-11,frame_ang_co=22.5,phi_ang_co=22.5,psi_ang_co=22.5
    #[arg(long)]
    criteria: Option<String>,

    //Number of query proteins
    #[arg(long, default_value_t = 5)]
    num_query: usize,

    //Number of unrelated proteins added to the index on top of the noisy query copies
    #[arg(long, default_value_t = 20)]
    num_index: usize,

    //Residues per generated protein
    #[arg(long, default_value_t = 40)]
    num_residues: usize,

    //Seed for the protein generator
    #[arg(long)]
    seed: Option<u64>,

    //Where to write the JSON report, or the config for write_config
    #[arg(short, long)]
    output: Option<String>,
}

#[derive(Debug, Serialize)]
struct Hit {
    query: String,
    index: String,
    matches: usize,
}

#[derive(Debug, Serialize)]
struct RunReport {
    query_build: BuildReport,
    index_build: BuildReport,
    scan: ScanReport,
    top_hits: Vec<Hit>,
}

const NUM_TOP_HITS: usize = 10;

fn main() {

    env_logger::init();

    let args = Args::parse();
    info!("{:?}", &args);

    let result = match args.task.as_str() {
        "scan" => scan(&args, false),
        "self_scan" => scan(&args, true),
        "write_config" => write_config(&args),
        _ => {
            error!("Unknown task: {}", args.task);
            std::process::exit(2);
        },
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn load_policy_config(args: &Args) -> Result<PolicyConfig> {

    let filename = args.config.as_ref().ok_or_else(|| Error::Config(format!(
        "the {} task needs a policy file from --config; run the write_config task for a template to fill in",
        args.task
    )))?;
    let mut config = PolicyConfig::from_file(filename)?;

    if let Some(criteria) = &args.criteria {
        let parsed: MatchCriteria = criteria.parse()?;
        config.criteria = parsed.config();
    }

    return Ok(config);
}

fn load_policy(args: &Args) -> Result<StandardPolicy> {

    let config = load_policy_config(args)?;
    info!("Using {}", config.criteria.build()?);
    return config.build();
}

fn write_config(args: &Args) -> Result<()> {

    let config = PolicyConfig::example();
    match &args.output {
        Some(filename) => config.to_file(filename)?,
        None => println!("{}", config.to_yaml()?),
    }

    return Ok(());
}

fn scan(args: &Args, self_scan: bool) -> Result<()> {

    let policy = load_policy(args)?;
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let queries: Vec<Protein> = (0..args.num_query)
        .map(|_| Protein::random(&mut rng, args.num_residues))
        .collect();

    let mut targets: Vec<Protein> = match self_scan {
        true => queries.clone(),
        false => queries.iter().map(|protein| protein.perturbed(&mut rng, 15.0, 0.5, 10.0)).collect(),
    };
    if !self_scan {
        targets.extend((0..args.num_index).map(|_| Protein::random(&mut rng, args.num_residues)));
    }

    let mut index = StructureIndex::new(&policy);
    for protein in tqdm!(targets.iter(), desc = "Indexing") {
        index.add_structure(protein)?;
    }

    let mut query_set = QuerySet::new(&policy);
    for protein in tqdm!(queries.iter(), desc = "Queries") {
        query_set.add_structure(protein)?;
    }

    let mut scores: HashMap<(u32, u32), usize> = HashMap::new();
    let scan_report = query_set.scan_with_report(&index, |query, entry| {
        *scores.entry((query.structure_id, entry.structure_id)).or_default() += 1;
    })?;

    let mut ranked: Vec<((u32, u32), usize)> = scores.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let top_hits = ranked.iter()
        .take(NUM_TOP_HITS)
        .map(|((query_id, index_id), matches)| Hit {
            query: queries[*query_id as usize].name().to_string(),
            index: targets[*index_id as usize].name().to_string(),
            matches: *matches,
        })
        .collect();

    let report = RunReport {
        query_build: query_set.build_report(),
        index_build: index.build_report(),
        scan: scan_report,
        top_hits,
    };

    let json = serde_json::to_string_pretty(&report)?;
    match &args.output {
        Some(filename) => std::fs::write(filename, json)?,
        None => println!("{}", json),
    }

    return Ok(());
}

#[cfg(test)]
mod tests {

    use super::*;

    fn args(extra: &[&str]) -> Args {

        let mut argv = vec!["scan_runner", "--task", "scan"];
        argv.extend_from_slice(extra);
        return Args::try_parse_from(argv).unwrap();
    }

    fn temp_config(name: &str, config: &PolicyConfig) -> String {

        let path = std::env::temp_dir().join(format!("scan_runner_{}_{}.yaml", name, std::process::id()));
        config.to_file(&path).unwrap();
        return path.to_string_lossy().into_owned();
    }

    #[test]
    fn quick_scan_needs_a_config() {

        assert!(matches!(load_policy_config(&args(&[])), Err(Error::Config(_))));

        let criteria_only = args(&["--criteria", "dist=40,dirn=1,index_dist=-5,frame_ang=35,phi_ang=10,psi_ang=10"]);
        assert!(matches!(load_policy_config(&criteria_only), Err(Error::Config(_))));
        assert!(load_policy(&criteria_only).is_err());
    }

    #[test]
    fn quick_config_is_loaded_and_criteria_override_it() {

        let mut written = PolicyConfig::example();
        written.criteria.maximum_squared_distance = 9.0;
        written.stride.index_from_stride = 2;
        let filename = temp_config("override", &written);

        let loaded = load_policy_config(&args(&["--config", filename.as_str()])).unwrap();
        assert_eq!(loaded, written);

        let overridden = load_policy_config(&args(&[
            "--config", filename.as_str(),
            "--criteria", "dist=16,dirn=0,index_dist=-3,frame_ang=20,phi_ang=30,psi_ang=30",
        ])).unwrap();
        std::fs::remove_file(&filename).unwrap();

        assert_eq!(overridden.criteria.maximum_squared_distance, 16.0);
        assert_eq!(overridden.criteria.minimum_index_distance, 3);
        assert!(!overridden.criteria.require_matching_directions);
        assert_eq!(overridden.keyer, written.keyer);
        assert_eq!(overridden.stride, written.stride);
    }

    #[test]
    fn quick_missing_config_file_fails() {

        let missing = args(&["--config", "/nonexistent/scan_runner_policy.yaml"]);
        assert!(matches!(load_policy_config(&missing), Err(Error::Io(_))));
    }
}
