#[cfg(test)]
mod reduce_regression_tests {
    use std::net::{Ipv4Addr, Ipv6Addr};

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use ipreduce::aggregate::merge_ranges;
    use ipreduce::ip::{Address, AddressFamily, AddressRange, PrefixBlock};
    use ipreduce::reduce::{eliminate, reduce_ranges, EnabledSet, Histogram, ReduceParams};

    fn v4(s: &str) -> u32 {
        u32::from(s.parse::<Ipv4Addr>().unwrap())
    }

    fn v6(s: &str) -> u128 {
        u128::from(s.parse::<Ipv6Addr>().unwrap())
    }

    fn render<A: Address>(blocks: &[PrefixBlock<A>]) -> Vec<String> {
        blocks.iter().map(|b| b.to_string()).collect()
    }

    /// Random disjoint ranges built from prefixes of lengths `min_len..=max_len`
    fn random_v4_ranges(rng: &mut StdRng, count: usize, min_len: u8, max_len: u8) -> Vec<AddressRange<u32>> {
        let raw = (0..count)
            .map(|_| {
                let length = rng.gen_range(min_len..=max_len);
                PrefixBlock::containing(rng.gen::<u32>(), length).unwrap().to_range()
            })
            .collect();
        merge_ranges(raw)
    }

    fn random_v6_ranges(rng: &mut StdRng, count: usize, min_len: u8, max_len: u8) -> Vec<AddressRange<u128>> {
        let raw = (0..count)
            .map(|_| {
                let length = rng.gen_range(min_len..=max_len);
                // keep everything inside 2000::/3 so ranges cluster a bit
                let addr = (rng.gen::<u128>() >> 3) | (1u128 << 125);
                PrefixBlock::containing(addr, length).unwrap().to_range()
            })
            .collect();
        merge_ranges(raw)
    }

    fn reassemble<A: Address>(blocks: &[PrefixBlock<A>]) -> Vec<AddressRange<A>> {
        merge_ranges(blocks.iter().map(|b| b.to_range()).collect())
    }

    /// /24 and adjacent /25 with a tight ceiling stay untouched
    #[test]
    fn test_ipv4_example_is_left_unchanged() {
        let ranges = vec![
            AddressRange::new(v4("10.0.0.0"), v4("10.0.0.255")).unwrap(),
            AddressRange::new(v4("10.0.1.0"), v4("10.0.1.127")).unwrap(),
        ];
        let params = ReduceParams { reduce_pct: 20.0, reduce_entries_min: 1 };
        let (blocks, reduction) = reduce_ranges(&ranges, &params);

        assert_eq!(reduction.initial.to_map().into_iter().collect::<Vec<_>>(), vec![(24, 1), (25, 1)]);
        assert_eq!(reduction.ceiling, 2);
        assert_eq!(reduction.rejected.map(|c| c.projected_total), Some(3));
        assert_eq!(render(&blocks), vec!["10.0.0.0/24", "10.0.1.0/25"]);
    }

    #[test]
    fn test_full_ipv4_space_is_one_block() {
        let ranges = vec![AddressRange::<u32>::full()];
        let (blocks, reduction) = reduce_ranges(&ranges, &ReduceParams::default());
        assert_eq!(render(&blocks), vec!["0.0.0.0/0"]);
        assert_eq!(reduction.total(), 1);
        assert!(reduction.eliminations.is_empty());
    }

    #[test]
    fn test_full_ipv6_space_is_one_block() {
        let ranges = vec![AddressRange::<u128>::full()];
        let (blocks, _) = reduce_ranges(&ranges, &ReduceParams::default());
        assert_eq!(render(&blocks), vec!["::/0"]);
    }

    #[test]
    fn test_empty_family_produces_nothing() {
        let (blocks, reduction) = reduce_ranges::<u32>(&[], &ReduceParams::default());
        assert!(blocks.is_empty());
        assert_eq!(reduction.ceiling, 16384);
        assert!(reduction.eliminations.is_empty());
    }

    #[test]
    fn test_generous_ceiling_reduces_lengths() {
        let ranges = vec![
            AddressRange::new(v4("10.0.0.0"), v4("10.0.3.255")).unwrap(),
            AddressRange::new(v4("10.1.0.0"), v4("10.1.0.255")).unwrap(),
            AddressRange::new(v4("10.2.0.0"), v4("10.2.0.255")).unwrap(),
            AddressRange::new(v4("10.3.0.0"), v4("10.3.0.127")).unwrap(),
        ];
        let (blocks, reduction) = reduce_ranges(&ranges, &ReduceParams::default());

        // /24 -> /25 costs 2, then /22 -> /25 costs 7; both fit under 16384
        assert_eq!(reduction.active_lengths(), vec![25]);
        assert_eq!(blocks.len(), 8 + 2 + 2 + 1);
        assert!(blocks.iter().all(|b| b.length() == 25));
        assert_eq!(reassemble(&blocks), ranges);
    }

    #[test]
    fn test_address_set_equivalence_ipv4() {
        let mut rng = StdRng::seed_from_u64(0x1f2e3d4c);
        for (count, pct, min) in [(50, 20.0, 1), (500, 20.0, 16384), (2000, 5.0, 100), (300, 200.0, 0)] {
            let ranges = random_v4_ranges(&mut rng, count, 8, 32);
            let (blocks, reduction) = reduce_ranges(&ranges, &ReduceParams { reduce_pct: pct, reduce_entries_min: min });

            assert_eq!(reassemble(&blocks), ranges);
            assert_eq!(blocks.len() as u64, reduction.total());
            for block in &blocks {
                assert!(reduction.enabled.contains(block.length()));
            }
        }
    }

    #[test]
    fn test_address_set_equivalence_ipv6() {
        let mut rng = StdRng::seed_from_u64(0x6006);
        for (count, pct, min) in [(40, 20.0, 1), (400, 20.0, 16384), (1000, 50.0, 0)] {
            let ranges = random_v6_ranges(&mut rng, count, 16, 64);
            let (blocks, reduction) = reduce_ranges(&ranges, &ReduceParams { reduce_pct: pct, reduce_entries_min: min });

            assert_eq!(reassemble(&blocks), ranges);
            assert_eq!(blocks.len() as u64, reduction.total());
        }
    }

    #[test]
    fn test_restricted_split_reassembles_for_any_enabled_set() {
        let mut rng = StdRng::seed_from_u64(42);
        let ranges = random_v4_ranges(&mut rng, 200, 4, 32);
        for _ in 0..20 {
            let lengths: Vec<u8> = (0..=32u8).filter(|_| rng.gen_bool(0.3)).collect();
            let enabled = EnabledSet::from_lengths(AddressFamily::Ipv4, lengths);
            for range in &ranges {
                let blocks: Vec<_> = range.restricted_split(&enabled).collect();
                assert!(blocks.windows(2).all(|w| w[0].last() < w[1].first()));
                assert_eq!(reassemble(&blocks), vec![*range]);
            }
        }
    }

    #[test]
    fn test_committed_steps_are_monotonic_and_bounded() {
        let mut rng = StdRng::seed_from_u64(7);
        for pct in [0.0, 10.0, 20.0, 80.0] {
            let ranges = random_v4_ranges(&mut rng, 3000, 10, 30);
            let reduction = eliminate(
                Histogram::from_ranges(&ranges),
                &ReduceParams { reduce_pct: pct, reduce_entries_min: 0 },
            );

            let mut previous = reduction.initial_total();
            for step in &reduction.eliminations {
                assert!(step.projected_total >= previous);
                assert!(step.projected_total <= reduction.ceiling);
                previous = step.projected_total;
            }
            assert_eq!(previous, reduction.total());
            if let Some(rejected) = reduction.rejected {
                assert!(rejected.projected_total > reduction.ceiling);
            }
        }
    }

    #[test]
    fn test_rejected_first_step_keeps_minimal_split() {
        let mut rng = StdRng::seed_from_u64(99);
        let ranges = random_v4_ranges(&mut rng, 400, 12, 32);
        let params = ReduceParams { reduce_pct: 0.0, reduce_entries_min: 0 };
        let (blocks, reduction) = reduce_ranges(&ranges, &params);

        assert!(reduction.eliminations.is_empty());
        let minimal: Vec<_> = ranges.iter().flat_map(|r| r.minimal_split()).collect();
        assert_eq!(blocks, minimal);
    }

    #[test]
    fn test_host_length_is_never_removed() {
        let mut rng = StdRng::seed_from_u64(1234);
        let ranges = random_v6_ranges(&mut rng, 500, 20, 128);
        let params = ReduceParams { reduce_pct: 1000.0, reduce_entries_min: 100_000 };
        let (_, reduction) = reduce_ranges(&ranges, &params);
        assert!(reduction.enabled.contains(128));

        let ranges4 = vec![AddressRange::new(v4("192.0.2.1"), v4("192.0.2.1")).unwrap()];
        let (blocks, reduction) = reduce_ranges(&ranges4, &params);
        assert!(reduction.enabled.contains(32));
        assert_eq!(render(&blocks), vec!["192.0.2.1/32"]);
    }

    #[test]
    fn test_ipv6_unaligned_range() {
        let ranges = vec![AddressRange::new(v6("2001:db8::"), v6("2001:db8::2:ffff")).unwrap()];
        let (blocks, _) = reduce_ranges(&ranges, &ReduceParams { reduce_pct: 0.0, reduce_entries_min: 0 });
        assert_eq!(render(&blocks), vec!["2001:db8::/111", "2001:db8::2:0/112"]);
    }
}
