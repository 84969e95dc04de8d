pub mod implicit_dual_quaternion;
