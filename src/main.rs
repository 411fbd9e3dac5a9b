fn main() {
    shoulder_kinematics::cli::run();
}
