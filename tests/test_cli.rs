#[cfg(test)]
mod test_cli {
    use std::process::{Command, Output};

    fn network(name: &str) -> String {
        format!("{}/networks/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    fn run_cli(args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_bayesenum"))
            .args(args)
            .env_remove("RUST_LOG")
            .output()
            .expect("failed to run bayesenum")
    }

    #[test]
    fn test_missing_network_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.bn");
        let out = run_cli(&[missing.to_str().unwrap(), "-q", "A"]);

        assert!(!out.status.success());
        let stderr = String::from_utf8_lossy(&out.stderr);
        assert!(!stderr.trim().is_empty());
        assert!(stderr.contains("absent.bn"), "stderr: {stderr}");
        assert!(out.stdout.is_empty());
    }

    #[test]
    fn test_batch_queries_print_distributions() {
        let chain = network("chain.bn");
        let out = run_cli(&[&chain, "-q", "B", "--query", "A | B = true"]);

        assert!(out.status.success());
        assert_eq!(
            String::from_utf8_lossy(&out.stdout),
            "P(true) = 0.3100, P(false) = 0.6900\n\nP(true) = 0.7742, P(false) = 0.2258\n\n"
        );
    }

    #[test]
    fn test_failed_batch_query_reported_once() {
        let chain = network("chain.bn");
        let out = run_cli(&[&chain, "-q", "Z", "-q", "A"]);

        assert!(!out.status.success());
        let stderr = String::from_utf8_lossy(&out.stderr);
        assert_eq!(stderr.matches("unknown variable 'Z'").count(), 1, "stderr: {stderr}");
        assert!(String::from_utf8_lossy(&out.stdout).starts_with("P(true) = 0.3000"));
    }
}
