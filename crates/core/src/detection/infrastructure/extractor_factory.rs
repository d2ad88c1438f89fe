use crate::detection::domain::region_extractor::{CountStrategy, RegionExtractor};

use super::connected_component_extractor::ConnectedComponentExtractor;
use super::grid_scan_extractor::GridScanExtractor;

/// Creates the region extractor for the configured counting strategy.
///
/// The choice is made once at startup and logged, so a session's face counts
/// are always attributable to one strategy.
pub fn create_extractor(
    strategy: CountStrategy,
    min_component_pixels: usize,
    grid_cell_size: usize,
) -> Box<dyn RegionExtractor> {
    match strategy {
        CountStrategy::Clustering => {
            log::info!(
                "Counting faces by connected-component clustering (min {} cells)",
                min_component_pixels
            );
            Box::new(ConnectedComponentExtractor::new(min_component_pixels))
        }
        CountStrategy::GridScan => {
            log::info!("Counting faces by grid scan ({grid_cell_size}x{grid_cell_size} cells)");
            Box::new(GridScanExtractor::new(grid_cell_size))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(CountStrategy::Clustering)]
    #[case(CountStrategy::GridScan)]
    fn test_factory_honours_strategy(#[case] strategy: CountStrategy) {
        let ex = create_extractor(strategy, 5, 8);
        assert_eq!(ex.strategy(), strategy);
    }
}
