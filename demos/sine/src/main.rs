#[macro_use]
extern crate log;

use std::{error::Error, time::Instant};

use dialoguer::{theme::ColorfulTheme, Select};
use lin_reg::{predict, rmse, with_bias_column, LinReg, TikhonovRegularization};
use nalgebra::{DMatrix, Dim, Matrix};
use simple_esn::{EchoStateNetwork, Params};
use time_series_generator::generate_sine_wave;

mod plot;

use plot::{plot, Series};

const TRAIN_LEN: usize = 600;
const DISCARD_STEPS: usize = 100;
const SEED: Option<u64> = Some(0);

pub(crate) fn main() -> Result<(), Box<dyn Error>> {
    pretty_env_logger::init();

    let mut values: Vec<f64> = generate_sine_wave(100);
    values.append(&mut values.clone());
    values.append(&mut values.clone());
    values.append(&mut values.clone());
    info!("got {} datapoints", values.len());

    let values: DMatrix<f64> =
        Matrix::from_vec_generic(Dim::from_usize(values.len()), Dim::from_usize(1), values);

    let presets = vec!["leaky", "memoryless", "long memory"];
    let e = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select reservoir dynamics")
        .items(&presets)
        .default(0)
        .interact()?;
    let (damping, weight_scaling) = match e {
        0 => (0.5, 0.9),
        1 => (1.0, 0.9),
        2 => (0.2, 1.25),
        _ => return Err(format!("invalid preset selection {}", e).into()),
    };
    let params = Params {
        n_components: 200,
        damping,
        weight_scaling,
        discard_steps: DISCARD_STEPS,
        seed: SEED,
        ..Params::new(100)
    };
    info!("params: {:?}", params);

    let n_vals = values.nrows();
    let mut esn = EchoStateNetwork::new(params)?;

    // the reservoir is drawn on the training window and reused for the whole series
    let t0 = Instant::now();
    esn.fit(&values.rows(0, TRAIN_LEN))?;
    let echoes = esn.transform(&values.rows(0, n_vals - 1))?;
    info!("echoes of {} steps done in: {}ms", n_vals - 1, t0.elapsed().as_millis());

    let design = with_bias_column(&echoes.rows(0, echoes.nrows()));
    let targets = values.rows(DISCARD_STEPS + 1, n_vals - DISCARD_STEPS - 1);
    let train_rows = TRAIN_LEN - DISCARD_STEPS;
    let test_rows = design.nrows() - train_rows;

    let regressor = TikhonovRegularization {
        regularization_coeff: 1e-4,
    };
    let readout =
        regressor.fit_readout(&design.rows(0, train_rows), &targets.rows(0, train_rows))?;

    let predictions = predict(&design.rows(0, design.nrows()), &readout);
    let train_predictions = predictions.rows(0, train_rows).into_owned();
    let test_predictions = predictions.rows(train_rows, test_rows).into_owned();
    info!(
        "train rmse: {}, test rmse: {}",
        rmse(&train_predictions, &targets.rows(0, train_rows)),
        rmse(&test_predictions, &targets.rows(train_rows, test_rows)),
    );

    // each prediction is plotted at the time step of its target
    let first_step = DISCARD_STEPS + 1;
    let to_series = |offset: usize, m: &DMatrix<f64>| -> Series {
        m.iter().enumerate().map(|(i, v)| ((offset + i) as f64, *v)).collect()
    };
    let plot_targets = to_series(first_step, &targets.into_owned());
    let train_series = to_series(first_step, &train_predictions);
    let test_series = to_series(first_step + train_rows, &test_predictions);

    let filename = format!("img/sine_esn_{}.png", presets[e].replace(' ', "_"));
    plot(&plot_targets, &train_series, &test_series, &filename, (2160, 2160))?;

    Ok(())
}
