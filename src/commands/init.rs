use crate::cli::InitArgs;
use crate::hmm::{flat_start, random_start};
use crate::utils::{create_writer, write_model, Alphabet, ModelFile, Result};
use rand::{rngs::StdRng, SeedableRng};

pub fn init(args: InitArgs) -> Result<()> {
    let model = build_model(&args)?;
    let mut writer = create_writer(Some(&args.output_path))?;
    write_model(&mut writer, &model)?;
    log::info!(
        "Wrote {} model with {} states and {} symbols to {}",
        if args.random { "random" } else { "flat" },
        model.hmm.num_states(),
        model.hmm.num_symbols(),
        args.output_path.display()
    );
    Ok(())
}

fn build_model(args: &InitArgs) -> Result<ModelFile> {
    let symbols = match &args.alphabet {
        Some(names) => Some(Alphabet::new(names.0.iter().cloned())?),
        None => None,
    };
    let num_symbols = match (&symbols, args.num_symbols) {
        (Some(alphabet), _) => alphabet.len(),
        (None, Some(num_symbols)) => num_symbols,
        (None, None) => return Err("Either --symbols or --alphabet is required".to_string()),
    };

    let hmm = if args.random {
        let mut rng = match args.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        random_start(args.num_states, num_symbols, &mut rng)?
    } else {
        flat_start(args.num_states, num_symbols)?
    };

    Ok(ModelFile {
        hmm,
        states: None,
        symbols,
    })
}
