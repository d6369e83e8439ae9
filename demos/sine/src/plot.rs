use std::{error::Error, fs, path::Path};

use plotters::prelude::*;

pub type Series = Vec<(f64, f64)>;

/// Plot targets against the readout predictions of the training and test window
pub fn plot(
    targets: &Series,
    train_preds: &Series,
    test_preds: &Series,
    filename: &str,
    dims: (u32, u32),
) -> Result<(), Box<dyn Error>> {
    info!(
        "n_targets: {}, n_train_preds: {}, n_test_preds: {}",
        targets.len(),
        train_preds.len(),
        test_preds.len()
    );
    if targets.is_empty() {
        return Err("nothing to plot".into());
    }

    let ts_min = targets[0].0;
    let ts_max = targets[targets.len() - 1].0;
    let (value_min, value_max) = targets
        .iter()
        .chain(train_preds.iter())
        .chain(test_preds.iter())
        .fold((f64::MAX, f64::MIN), |(lo, hi), (_, v)| (lo.min(*v), hi.max(*v)));
    debug!("value_min: {}, value_max: {}", value_min, value_max);

    if let Some(dir) = Path::new(filename).parent() {
        fs::create_dir_all(dir)?;
    }
    let root_area = BitMapBackend::new(filename, dims).into_drawing_area();
    root_area.fill(&WHITE)?;
    let root_area = root_area.titled(filename, ("sans-serif", 20).into_font())?;

    let mut cc0 = ChartBuilder::on(&root_area)
        .margin(5)
        .set_all_label_area_size(50)
        .caption("readout", ("sans-serif", 30).into_font().with_color(&BLACK))
        .build_cartesian_2d(ts_min..ts_max, value_min..value_max)?;
    cc0.configure_mesh()
        .x_labels(20)
        .y_labels(20)
        .x_label_formatter(&|v| format!("{:.0}", v))
        .y_label_formatter(&|v| format!("{:.4}", v))
        .draw()?;

    cc0.draw_series(LineSeries::new(targets.clone(), &BLACK))?
        .label("targets")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLACK));
    cc0.draw_series(LineSeries::new(train_preds.clone(), &RED))?
        .label("train_preds")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));
    cc0.draw_series(LineSeries::new(test_preds.clone(), &GREEN))?
        .label("test_preds")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &GREEN));
    cc0.configure_series_labels().border_style(&BLACK).draw()?;
    root_area.present()?;

    info!("successfully plotted to {}", filename);

    Ok(())
}
